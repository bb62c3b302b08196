use serde::Serialize;

/// Category of a failed selection-to-editor mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    EmptySelection,
    MultiBlockSelection,
    NonTextNode,
    OffsetComputationFailed,
    MappingFailed,
}

/// Why a selection could not be echoed into the editor.
///
/// The `Display` text is what the user sees in the error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("selection is empty")]
    EmptySelection,
    #[error("selection spans multiple blocks; select within one block")]
    MultiBlockSelection,
    #[error("selection range is not addressable text")]
    NonTextNode,
    #[error("could not compute offset")]
    OffsetComputationFailed,
    #[error("selected text could not be located")]
    MappingFailed,
}

impl SelectionError {
    pub fn kind(self) -> ErrorKind {
        match self {
            Self::EmptySelection => ErrorKind::EmptySelection,
            Self::MultiBlockSelection => ErrorKind::MultiBlockSelection,
            Self::NonTextNode => ErrorKind::NonTextNode,
            Self::OffsetComputationFailed => ErrorKind::OffsetComputationFailed,
            Self::MappingFailed => ErrorKind::MappingFailed,
        }
    }

    /// Silent errors are never shown to the user.
    pub fn is_silent(self) -> bool {
        matches!(self, Self::EmptySelection)
    }
}

/// What the error channel carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    pub kind: ErrorKind,
    pub text: String,
}

impl From<SelectionError> for ErrorMessage {
    fn from(err: SelectionError) -> Self {
        Self {
            kind: err.kind(),
            text: err.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Failure of a host primitive (editor, selection API, viewport, sink).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("editor is not mounted")]
    NotMounted,
    #[error("host API unavailable: {0}")]
    Unavailable(String),
}

/// Invalid search-highlighter configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("marker <{tag} class=\"{class}\"> would be removed by the sanitize policy")]
    MarkerNotAllowed { tag: String, class: String },
}
