/// Collapse every whitespace run (U+00A0 included) to one ASCII space and
/// trim both ends.
pub fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A normalized string that remembers where each of its chars came from.
///
/// Normalized positions can be mapped back to positions in the raw input,
/// which is what lets a match found in normalized space land on real
/// editor coordinates when the two sides disagree about whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    /// Raw char index of each normalized char. A collapsed space points at
    /// the first char of its run.
    origins: Vec<usize>,
    raw_len: usize,
}

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut origins = Vec::with_capacity(raw.len());
        let mut pending_space = None;
        let mut raw_len = 0;

        for (i, c) in raw.chars().enumerate() {
            raw_len = i + 1;
            if c.is_whitespace() {
                if pending_space.is_none() && !text.is_empty() {
                    pending_space = Some(i);
                }
                continue;
            }
            if let Some(at) = pending_space.take() {
                text.push(' ');
                origins.push(at);
            }
            text.push(c);
            origins.push(i);
        }

        Self {
            text,
            origins,
            raw_len,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Length of the raw input in chars.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Normalized position of raw position `raw`.
    ///
    /// The first char of a whitespace run maps to the collapsed space; the
    /// rest of the run maps to the char after it.
    pub fn to_normalized(&self, raw: usize) -> usize {
        if raw >= self.raw_len {
            return self.len() + (raw - self.raw_len);
        }
        self.origins.partition_point(|&origin| origin < raw)
    }

    /// Raw position where normalized char `pos` starts.
    pub fn raw_start(&self, pos: usize) -> usize {
        self.origins.get(pos).copied().unwrap_or(self.raw_len)
    }

    /// Raw exclusive end for a normalized span ending at `end`.
    pub fn raw_end(&self, end: usize) -> usize {
        match end.checked_sub(1).and_then(|last| self.origins.get(last)) {
            Some(&origin) => origin + 1,
            None if end == 0 => 0,
            None => self.raw_len,
        }
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("   ", "")]
    #[case("plain", "plain")]
    #[case("  a  b  ", "a b")]
    #[case("a\u{a0}b", "a b")]
    #[case("a \u{a0}\t\n b", "a b")]
    #[case("line\r\nbreak", "line break")]
    fn collapses_and_trims(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
        assert_eq!(NormalizedText::new(input).as_str(), expected);
    }

    #[rstest]
    #[case("a  b")]
    #[case("\u{a0}x\u{a0}\u{a0}y ")]
    #[case("already clean")]
    fn normalize_is_idempotent(#[case] input: &str) {
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn maps_positions_both_ways() {
        //          0123456789
        let raw = "  ab   cd ";
        let text = NormalizedText::new(raw);
        assert_eq!(text.as_str(), "ab cd");
        assert_eq!(text.raw_len(), 10);

        assert_eq!(text.to_normalized(0), 0);
        assert_eq!(text.to_normalized(2), 0);
        assert_eq!(text.to_normalized(3), 1);
        assert_eq!(text.to_normalized(4), 2);
        assert_eq!(text.to_normalized(5), 3);
        assert_eq!(text.to_normalized(7), 3);
        assert_eq!(text.to_normalized(9), 5);
        assert_eq!(text.to_normalized(10), 5);

        assert_eq!(text.raw_start(0), 2);
        assert_eq!(text.raw_start(2), 4);
        assert_eq!(text.raw_start(3), 7);
        assert_eq!(text.raw_start(5), 10);
        assert_eq!(text.raw_end(2), 4);
        assert_eq!(text.raw_end(5), 9);
        assert_eq!(text.raw_end(0), 0);
    }

    #[test]
    fn identity_when_already_normal() {
        let text = NormalizedText::new("Hello there.");
        for i in 0..=12 {
            assert_eq!(text.to_normalized(i), i);
            assert_eq!(text.raw_start(i), i);
        }
        assert_eq!(text.raw_end(12), 12);
    }
}
