//! Locating a [`SelectionDescriptor`] in the editor's plain text.
//!
//! The block text is searched for in the editor (whitespace-normalized on
//! both sides) and every occurrence is a candidate. A candidate is accepted
//! only if the editor text at the selection's position within it normalizes
//! to the selected text, so repeated blocks are told apart by content and a
//! diverged editor yields an error rather than a wrong range.

use serde::{Deserialize, Serialize};

use crate::{
    error::SelectionError,
    models::{EditorRange, SelectionDescriptor},
    text::{NormalizedText, char_slice, normalize, occurrences},
};

/// What to do when no block occurrence reproduces the selected text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Report [`SelectionError::MappingFailed`].
    #[default]
    Disabled,
    /// Search for the first `prefix_chars` of the selection and accept the
    /// first occurrence whose full span is similar enough.
    Prefix {
        prefix_chars: usize,
        min_similarity: f64,
    },
}

impl FallbackPolicy {
    pub const DEFAULT_PREFIX_CHARS: usize = 20;
    pub const DEFAULT_MIN_SIMILARITY: f64 = 0.9;

    pub fn prefix() -> Self {
        Self::Prefix {
            prefix_chars: Self::DEFAULT_PREFIX_CHARS,
            min_similarity: Self::DEFAULT_MIN_SIMILARITY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionResolver {
    fallback: FallbackPolicy,
}

impl PositionResolver {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Map `descriptor` onto `full_text`, the editor's plain text.
    ///
    /// The returned range is in raw editor chars.
    pub fn resolve(
        &self,
        descriptor: &SelectionDescriptor,
        full_text: &str,
    ) -> Result<EditorRange, SelectionError> {
        let block = NormalizedText::new(&descriptor.block_text);
        let wanted = normalize(&descriptor.selected_text);
        if block.is_empty() || wanted.is_empty() {
            return Err(SelectionError::MappingFailed);
        }
        let editor = NormalizedText::new(full_text);

        let rel_start = block.to_normalized(descriptor.offset);
        let rel_end = block
            .to_normalized(descriptor.offset + descriptor.length)
            .max(rel_start);

        let candidates = occurrences(editor.as_str(), block.as_str());
        log::debug!(
            "resolve: {} candidate block occurrence(s) for {:?}",
            candidates.len(),
            descriptor.selected_text
        );

        for candidate in candidates {
            let start = candidate + rel_start;
            let end = candidate + rel_end;
            if end > editor.len() {
                continue;
            }
            let found = char_slice(editor.as_str(), start, end);
            if normalize(found) == wanted {
                let (start, end) = trim_spaces(found, start, end);
                return Ok(raw_span(&editor, start, end));
            }
        }

        match self.fallback {
            FallbackPolicy::Disabled => {}
            FallbackPolicy::Prefix {
                prefix_chars,
                min_similarity,
            } => {
                if let Some(range) = by_prefix(&editor, &wanted, prefix_chars, min_similarity) {
                    log::debug!("resolve: accepted prefix fallback at {range:?}");
                    return Ok(range);
                }
            }
        }

        log::debug!("resolve: no candidate reproduces {:?}", descriptor.selected_text);
        Err(SelectionError::MappingFailed)
    }
}

/// Narrow `start..end` past the spaces at either edge of `found`, the
/// normalized text it covers.
fn trim_spaces(found: &str, start: usize, end: usize) -> (usize, usize) {
    let leading = found.chars().take_while(|&c| c == ' ').count();
    let trailing = found.chars().rev().take_while(|&c| c == ' ').count();
    (start + leading, end.saturating_sub(trailing).max(start + leading))
}

/// Raw editor range covering normalized chars `start..end`.
fn raw_span(editor: &NormalizedText, start: usize, end: usize) -> EditorRange {
    let index = editor.raw_start(start);
    let raw_end = editor.raw_end(end).max(index);
    EditorRange::new(index, raw_end - index)
}

fn by_prefix(
    editor: &NormalizedText,
    wanted: &str,
    prefix_chars: usize,
    min_similarity: f64,
) -> Option<EditorRange> {
    let wanted_len = wanted.chars().count();
    if prefix_chars == 0 || wanted_len <= prefix_chars {
        return None;
    }
    let prefix = char_slice(wanted, 0, prefix_chars);

    occurrences(editor.as_str(), prefix)
        .into_iter()
        .map(|start| (start, (start + wanted_len).min(editor.len())))
        .find(|&(start, end)| {
            similarity(char_slice(editor.as_str(), start, end), wanted) >= min_similarity
        })
        .map(|(start, end)| raw_span(editor, start, end))
}

/// Share of positions at which `a` and `b` hold the same char, over the
/// longer of the two.
fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let same = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    same as f64 / longest as f64
}
