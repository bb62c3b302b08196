//! Whitespace normalization and char-indexed string helpers.

pub mod normalize;

pub use normalize::{NormalizedText, normalize};

/// Byte offset of the char at `char_index`, or `s.len()` past the end.
pub fn char_to_byte(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(byte, _)| byte)
}

/// Substring by char positions, clamped to the string.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let start_byte = char_to_byte(s, start);
    let end_byte = char_to_byte(s, end.max(start));
    &s[start_byte..end_byte]
}

/// Char positions of every occurrence of `needle` in `haystack`,
/// overlapping occurrences included.
pub fn occurrences(haystack: &str, needle: &str) -> Vec<usize> {
    let mut found = Vec::new();
    if needle.is_empty() {
        return found;
    }
    let mut from = 0;
    let mut chars_before = 0;
    while let Some(rel) = haystack[from..].find(needle) {
        let byte = from + rel;
        chars_before += haystack[from..byte].chars().count();
        found.push(chars_before);
        // step one char so overlapping occurrences are seen
        let step = haystack[byte..].chars().next().map_or(1, char::len_utf8);
        from = byte + step;
        chars_before += 1;
    }
    found
}
