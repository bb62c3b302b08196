use serde::{Deserialize, Serialize};

/// A selection expressed relative to the block that contains it.
///
/// `offset` and `length` count chars in `block_text`, the concatenated text
/// of the block's text leaves. `selected_text` is the trimmed selection
/// string, used to verify a candidate position in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDescriptor {
    pub block_text: String,
    pub offset: usize,
    pub length: usize,
    pub selected_text: String,
}

impl SelectionDescriptor {
    pub fn new(
        block_text: impl Into<String>,
        offset: usize,
        length: usize,
        selected_text: impl Into<String>,
    ) -> Self {
        Self {
            block_text: block_text.into(),
            offset,
            length,
            selected_text: selected_text.into(),
        }
    }
}
