//! In-memory hosts for tests and the command line.

use std::fmt;

use xi_rope::{Rope, delta::Builder};

use super::{
    CommitSink, Formats, PreviewViewport, RichTextDocument, SelectionRange, TextSelectionSource,
};
use crate::{error::HostError, models::EditorRange, search::MatchHandle, text::char_to_byte};

/// A call made on a [`MemoryDocument`], recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCall {
    Format {
        range: EditorRange,
        name: String,
        value: String,
    },
    RemoveFormat {
        range: EditorRange,
        name: String,
    },
    SetSelection {
        index: usize,
        length: usize,
    },
    Focus,
}

/// A rich-text document held in an xi-rope buffer with per-char formats.
#[derive(Clone)]
pub struct MemoryDocument {
    buffer: Rope,
    /// One entry per char of `buffer`.
    formats: Vec<Formats>,
    selection: Option<EditorRange>,
    focused: bool,
    mounted: bool,
    calls: Vec<DocumentCall>,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("text", &self.buffer.to_string())
            .field("selection", &self.selection)
            .field("focused", &self.focused)
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl MemoryDocument {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            formats: vec![Formats::new(); text.chars().count()],
            selection: None,
            focused: false,
            mounted: true,
            calls: Vec::new(),
        }
    }

    /// A document whose every primitive fails with [`HostError::NotMounted`].
    pub fn unmounted(text: &str) -> Self {
        Self {
            mounted: false,
            ..Self::new(text)
        }
    }

    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn contents(&self) -> String {
        self.buffer.to_string()
    }

    pub fn selection(&self) -> Option<EditorRange> {
        self.selection
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn calls(&self) -> &[DocumentCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Replace `range` with `text`, as a user edit would. Inserted chars
    /// carry no formats.
    pub fn replace(&mut self, range: EditorRange, text: &str) {
        let range = range.clamp_to(self.len());
        let current = self.buffer.to_string();
        let start = char_to_byte(&current, range.index);
        let end = char_to_byte(&current, range.end());

        let mut builder = Builder::new(self.buffer.len());
        builder.replace(start..end, Rope::from(text));
        self.buffer = builder.build().apply(&self.buffer);

        let tail = self.formats.split_off(range.end());
        self.formats.truncate(range.index);
        self.formats
            .extend(std::iter::repeat_with(Formats::new).take(text.chars().count()));
        self.formats.extend(tail);
    }

    pub fn insert(&mut self, index: usize, text: &str) {
        self.replace(EditorRange::new(index, 0), text);
    }

    pub fn delete(&mut self, range: EditorRange) {
        self.replace(range, "");
    }

    /// Maximal runs of chars carrying format `name`.
    pub fn formatted_runs(&self, name: &str) -> Vec<EditorRange> {
        let mut runs = Vec::new();
        let mut start = None;
        for (i, formats) in self.formats.iter().enumerate() {
            match (formats.contains_key(name), start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    runs.push(EditorRange::from(s..i));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push(EditorRange::from(s..self.len()));
        }
        runs
    }

    fn ensure_mounted(&self) -> Result<(), HostError> {
        if self.mounted {
            Ok(())
        } else {
            Err(HostError::NotMounted)
        }
    }
}

impl RichTextDocument for MemoryDocument {
    fn text(&self) -> Result<String, HostError> {
        self.ensure_mounted()?;
        Ok(self.buffer.to_string())
    }

    fn format_text(&mut self, range: EditorRange, name: &str, value: &str) -> Result<(), HostError> {
        self.ensure_mounted()?;
        self.calls.push(DocumentCall::Format {
            range,
            name: name.to_string(),
            value: value.to_string(),
        });
        let range = range.clamp_to(self.len());
        for formats in &mut self.formats[range.as_range()] {
            formats.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_format(&mut self, range: EditorRange, name: &str) -> Result<(), HostError> {
        self.ensure_mounted()?;
        self.calls.push(DocumentCall::RemoveFormat {
            range,
            name: name.to_string(),
        });
        let range = range.clamp_to(self.len());
        for formats in &mut self.formats[range.as_range()] {
            formats.remove(name);
        }
        Ok(())
    }

    fn format_at(&self, range: EditorRange) -> Result<Formats, HostError> {
        self.ensure_mounted()?;
        let range = range.clamp_to(self.len());
        if range.is_empty() {
            // a caret reports the formats of the char before it
            return Ok(range
                .index
                .checked_sub(1)
                .map(|i| self.formats[i].clone())
                .unwrap_or_default());
        }
        let mut common = self.formats[range.index].clone();
        for formats in &self.formats[range.as_range()] {
            common.retain(|name, value| formats.get(name) == Some(value));
        }
        Ok(common)
    }

    fn set_selection(&mut self, index: usize, length: usize) -> Result<(), HostError> {
        self.ensure_mounted()?;
        self.calls.push(DocumentCall::SetSelection { index, length });
        self.selection = Some(EditorRange::new(index, length).clamp_to(self.len()));
        Ok(())
    }

    fn focus(&mut self) -> Result<(), HostError> {
        self.ensure_mounted()?;
        self.calls.push(DocumentCall::Focus);
        self.focused = true;
        Ok(())
    }
}

/// A selection source that reports a fixed range until cleared.
#[derive(Debug, Clone)]
pub struct StaticSelection<N> {
    range: Option<SelectionRange<N>>,
    available: bool,
}

impl<N> StaticSelection<N> {
    pub fn new(range: SelectionRange<N>) -> Self {
        Self {
            range: Some(range),
            available: true,
        }
    }

    pub fn empty() -> Self {
        Self {
            range: None,
            available: true,
        }
    }

    /// A selection API that is not there at all.
    pub fn unavailable() -> Self {
        Self {
            range: None,
            available: false,
        }
    }

    pub fn set(&mut self, range: SelectionRange<N>) {
        self.range = Some(range);
    }

    pub fn is_cleared(&self) -> bool {
        self.range.is_none()
    }
}

impl<N: Clone> TextSelectionSource for StaticSelection<N> {
    type Node = N;

    fn current_range(&self) -> Result<Option<SelectionRange<N>>, HostError> {
        if !self.available {
            return Err(HostError::Unavailable("selection".to_string()));
        }
        Ok(self.range.clone())
    }

    fn clear(&mut self) -> Result<(), HostError> {
        if !self.available {
            return Err(HostError::Unavailable("selection".to_string()));
        }
        self.range = None;
        Ok(())
    }
}

/// Remembers every element it was asked to scroll to.
#[derive(Debug, Clone, Default)]
pub struct RecordingViewport {
    pub scrolled: Vec<MatchHandle>,
}

impl RecordingViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<MatchHandle> {
        self.scrolled.last().copied()
    }
}

impl PreviewViewport for RecordingViewport {
    fn scroll_into_view(&mut self, handle: MatchHandle) -> Result<(), HostError> {
        self.scrolled.push(handle);
        Ok(())
    }
}

/// Collects committed content.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub commits: Vec<String>,
    pub failing: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every commit fails.
    pub fn failing() -> Self {
        Self {
            commits: Vec::new(),
            failing: true,
        }
    }
}

impl CommitSink for MemorySink {
    fn commit(&mut self, content: &str) -> Result<(), HostError> {
        if self.failing {
            return Err(HostError::Unavailable("commit target".to_string()));
        }
        self.commits.push(content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BoundaryPoint;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_are_tracked_per_char() {
        let mut doc = MemoryDocument::new("Hello world");
        doc.format_text(EditorRange::new(6, 5), "background", "yellow")
            .unwrap();

        assert_eq!(doc.formatted_runs("background"), vec![EditorRange::new(6, 5)]);
        assert_eq!(
            doc.format_at(EditorRange::new(6, 5)).unwrap().get("background"),
            Some(&"yellow".to_string())
        );
        // only partly formatted, so not effective across the span
        assert!(doc.format_at(EditorRange::new(4, 4)).unwrap().is_empty());
    }

    #[test]
    fn remove_format_is_idempotent() {
        let mut doc = MemoryDocument::new("Hello world");
        doc.format_text(EditorRange::new(0, 5), "background", "yellow")
            .unwrap();
        doc.remove_format(EditorRange::new(0, 5), "background").unwrap();
        doc.remove_format(EditorRange::new(0, 5), "background").unwrap();
        assert!(doc.formatted_runs("background").is_empty());
    }

    #[test]
    fn edits_go_through_the_rope_and_shift_formats() {
        let mut doc = MemoryDocument::new("Hello world");
        doc.format_text(EditorRange::new(6, 5), "bold", "true").unwrap();
        doc.insert(0, "¡");
        doc.delete(EditorRange::new(6, 1));

        assert_eq!(doc.contents(), "¡Helloworld");
        assert_eq!(doc.len(), 11);
        assert_eq!(doc.formatted_runs("bold"), vec![EditorRange::new(6, 5)]);
    }

    #[test]
    fn out_of_bounds_ranges_are_clamped() {
        let mut doc = MemoryDocument::new("abc");
        doc.format_text(EditorRange::new(2, 10), "x", "1").unwrap();
        doc.set_selection(9, 0).unwrap();
        assert_eq!(doc.formatted_runs("x"), vec![EditorRange::new(2, 1)]);
        assert_eq!(doc.selection(), Some(EditorRange::new(3, 0)));
    }

    #[test]
    fn unmounted_document_fails_every_primitive() {
        let mut doc = MemoryDocument::unmounted("abc");
        assert_eq!(doc.text(), Err(HostError::NotMounted));
        assert_eq!(doc.focus(), Err(HostError::NotMounted));
        assert!(doc.calls().is_empty());
    }

    #[test]
    fn static_selection_clears() {
        let mut selection = StaticSelection::new(SelectionRange::new(
            BoundaryPoint::new(1u32, 0),
            BoundaryPoint::new(1u32, 2),
            "ab",
        ));
        assert!(selection.current_range().unwrap().is_some());
        selection.clear().unwrap();
        assert!(selection.is_cleared());
        assert_eq!(selection.current_range().unwrap(), None);
    }
}
