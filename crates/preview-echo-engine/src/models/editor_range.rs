use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A span of the editor's linear text buffer, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EditorRange {
    pub index: usize,
    pub length: usize,
}

impl EditorRange {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// Exclusive end.
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_range(&self) -> Range<usize> {
        self.index..self.end()
    }

    /// Clamp to a buffer of `len` chars.
    pub fn clamp_to(&self, len: usize) -> Self {
        let index = self.index.min(len);
        Self {
            index,
            length: self.end().min(len) - index,
        }
    }
}

impl From<Range<usize>> for EditorRange {
    fn from(range: Range<usize>) -> Self {
        Self {
            index: range.start,
            length: range.end.saturating_sub(range.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_shrinks_to_buffer() {
        assert_eq!(EditorRange::new(3, 10).clamp_to(8), EditorRange::new(3, 5));
        assert_eq!(EditorRange::new(12, 2).clamp_to(8), EditorRange::new(8, 0));
        assert_eq!(EditorRange::new(1, 2).clamp_to(8), EditorRange::new(1, 2));
    }

    #[test]
    fn from_std_range() {
        assert_eq!(EditorRange::from(4..9), EditorRange::new(4, 5));
        assert_eq!(EditorRange::from(4..9).as_range(), 4..9);
    }
}
