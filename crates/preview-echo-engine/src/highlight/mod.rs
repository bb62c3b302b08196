//! The selection-echo highlight in the editor.
//!
//! One slot: applying a highlight first retracts the one before it. Moving
//! the editor cursor and focusing it are queued for the host's next paint
//! tick rather than done inline, since the host's own selection handling
//! would otherwise undo them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{error::HostError, host::RichTextDocument, models::EditorRange};

/// Format applied to the echoed range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub format: String,
    pub value: String,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            format: "background".to_string(),
            value: "#fff59d".to_string(),
        }
    }
}

/// Work queued for the next paint tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    MoveCursor { index: usize },
    Focus,
}

#[derive(Debug, Clone, Default)]
pub struct HighlightManager {
    style: HighlightStyle,
    tracked: Option<EditorRange>,
    deferred: VecDeque<DeferredAction>,
}

impl HighlightManager {
    pub fn new(style: HighlightStyle) -> Self {
        Self {
            style,
            tracked: None,
            deferred: VecDeque::new(),
        }
    }

    pub fn style(&self) -> &HighlightStyle {
        &self.style
    }

    /// The live highlight, if any.
    pub fn tracked(&self) -> Option<EditorRange> {
        self.tracked
    }

    pub fn pending(&self) -> impl Iterator<Item = &DeferredAction> {
        self.deferred.iter()
    }

    /// Highlight `range`, replacing the previous highlight.
    ///
    /// Returns whether `range` is now the tracked highlight. Host failures
    /// are logged; a failed retraction keeps the old range tracked and a
    /// failed format leaves nothing tracked.
    pub fn apply_highlight<D>(&mut self, doc: &mut D, range: EditorRange) -> bool
    where
        D: RichTextDocument + ?Sized,
    {
        self.deferred.clear();

        if let Some(previous) = self.tracked {
            if let Err(err) = self.retract(doc, previous) {
                log::warn!("highlight: could not retract {previous:?}: {err}");
                return false;
            }
            self.tracked = None;
        }

        if let Err(err) = doc.format_text(range, &self.style.format, &self.style.value) {
            log::warn!("highlight: could not format {range:?}: {err}");
            return false;
        }
        self.tracked = Some(range);
        self.deferred
            .extend([DeferredAction::MoveCursor { index: range.index }, DeferredAction::Focus]);
        true
    }

    /// Remove the highlight. No-op if there is none.
    pub fn clear_highlight<D>(&mut self, doc: &mut D)
    where
        D: RichTextDocument + ?Sized,
    {
        let Some(range) = self.tracked else {
            return;
        };
        match self.retract(doc, range) {
            Ok(()) => self.tracked = None,
            Err(err) => log::warn!("highlight: could not clear {range:?}: {err}"),
        }
    }

    /// Run the actions queued for this paint tick.
    pub fn flush_deferred<D>(&mut self, doc: &mut D)
    where
        D: RichTextDocument + ?Sized,
    {
        while let Some(action) = self.deferred.pop_front() {
            let result = match action {
                DeferredAction::MoveCursor { index } => doc.set_selection(index, 0),
                DeferredAction::Focus => doc.focus(),
            };
            if let Err(err) = result {
                log::warn!("highlight: deferred {action:?} failed: {err}");
            }
        }
    }

    /// Whether the tracked range still carries the highlight format.
    pub fn is_live<D>(&self, doc: &D) -> bool
    where
        D: RichTextDocument + ?Sized,
    {
        self.tracked.is_some_and(|range| {
            doc.format_at(range)
                .is_ok_and(|formats| formats.contains_key(&self.style.format))
        })
    }

    fn retract<D>(&self, doc: &mut D, range: EditorRange) -> Result<(), HostError>
    where
        D: RichTextDocument + ?Sized,
    {
        let formats = doc.format_at(range)?;
        if !formats.contains_key(&self.style.format) {
            log::debug!("highlight: {range:?} already clear");
        }
        // removal is idempotent and also covers a partly edited span
        doc.remove_format(range, &self.style.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DocumentCall, MemoryDocument};
    use pretty_assertions::assert_eq;

    const FORMAT: &str = "background";

    #[test]
    fn apply_formats_and_defers_cursor_work() {
        let mut doc = MemoryDocument::new("Hello world. Hello there.");
        let mut manager = HighlightManager::default();

        assert!(manager.apply_highlight(&mut doc, EditorRange::new(19, 5)));
        assert_eq!(manager.tracked(), Some(EditorRange::new(19, 5)));
        assert_eq!(doc.formatted_runs(FORMAT), vec![EditorRange::new(19, 5)]);
        // nothing moves until the paint tick
        assert_eq!(doc.selection(), None);
        assert!(!doc.is_focused());

        manager.flush_deferred(&mut doc);
        assert_eq!(doc.selection(), Some(EditorRange::new(19, 0)));
        assert!(doc.is_focused());
        assert_eq!(manager.pending().count(), 0);
    }

    #[test]
    fn calls_follow_format_then_cursor_then_focus() {
        let mut doc = MemoryDocument::new("abcdef");
        let mut manager = HighlightManager::default();
        manager.apply_highlight(&mut doc, EditorRange::new(1, 2));
        manager.flush_deferred(&mut doc);

        let order: Vec<_> = doc
            .calls()
            .iter()
            .map(|call| match call {
                DocumentCall::Format { .. } => "format",
                DocumentCall::RemoveFormat { .. } => "remove",
                DocumentCall::SetSelection { .. } => "cursor",
                DocumentCall::Focus => "focus",
            })
            .collect();
        assert_eq!(order, vec!["format", "cursor", "focus"]);
    }

    #[test]
    fn only_one_highlight_is_ever_live() {
        let mut doc = MemoryDocument::new("one two three four");
        let mut manager = HighlightManager::default();

        for range in [
            EditorRange::new(0, 3),
            EditorRange::new(4, 3),
            EditorRange::new(8, 5),
        ] {
            assert!(manager.apply_highlight(&mut doc, range));
            assert_eq!(doc.formatted_runs(FORMAT), vec![range]);
        }

        let calls = doc.calls();
        let second_format = calls
            .iter()
            .rposition(|c| matches!(c, DocumentCall::Format { .. }))
            .unwrap();
        assert_eq!(
            calls[second_format - 1],
            DocumentCall::RemoveFormat {
                range: EditorRange::new(4, 3),
                name: FORMAT.to_string()
            }
        );
    }

    #[test]
    fn new_highlight_drops_unflushed_actions() {
        let mut doc = MemoryDocument::new("one two");
        let mut manager = HighlightManager::default();
        manager.apply_highlight(&mut doc, EditorRange::new(0, 3));
        manager.apply_highlight(&mut doc, EditorRange::new(4, 3));

        assert_eq!(
            manager.pending().copied().collect::<Vec<_>>(),
            vec![DeferredAction::MoveCursor { index: 4 }, DeferredAction::Focus]
        );
    }

    #[test]
    fn clear_is_a_noop_without_highlight() {
        let mut doc = MemoryDocument::new("text");
        let mut manager = HighlightManager::default();
        manager.clear_highlight(&mut doc);
        assert!(doc.calls().is_empty());

        manager.apply_highlight(&mut doc, EditorRange::new(0, 4));
        manager.clear_highlight(&mut doc);
        assert_eq!(manager.tracked(), None);
        assert!(doc.formatted_runs(FORMAT).is_empty());
    }

    #[test]
    fn retracting_an_already_cleared_range_is_harmless() {
        let mut doc = MemoryDocument::new("text here");
        let mut manager = HighlightManager::default();
        manager.apply_highlight(&mut doc, EditorRange::new(0, 4));
        doc.remove_format(EditorRange::new(0, 4), FORMAT).unwrap();
        assert!(!manager.is_live(&doc));

        assert!(manager.apply_highlight(&mut doc, EditorRange::new(5, 4)));
        assert_eq!(doc.formatted_runs(FORMAT), vec![EditorRange::new(5, 4)]);
    }

    #[test]
    fn unmounted_editor_is_logged_and_ignored() {
        let mut doc = MemoryDocument::unmounted("text");
        let mut manager = HighlightManager::default();
        assert!(!manager.apply_highlight(&mut doc, EditorRange::new(0, 4)));
        assert_eq!(manager.tracked(), None);
        assert_eq!(manager.pending().count(), 0);
    }

    #[test]
    fn failed_retraction_keeps_the_tracked_range() {
        let mut doc = MemoryDocument::new("text here");
        let mut manager = HighlightManager::default();
        manager.apply_highlight(&mut doc, EditorRange::new(0, 4));

        doc.set_mounted(false);
        assert!(!manager.apply_highlight(&mut doc, EditorRange::new(5, 4)));
        manager.clear_highlight(&mut doc);
        assert_eq!(manager.tracked(), Some(EditorRange::new(0, 4)));

        doc.set_mounted(true);
        manager.clear_highlight(&mut doc);
        assert_eq!(manager.tracked(), None);
    }

    #[test]
    fn custom_style_is_used() {
        let mut doc = MemoryDocument::new("text");
        let mut manager = HighlightManager::new(HighlightStyle {
            format: "color".to_string(),
            value: "red".to_string(),
        });
        manager.apply_highlight(&mut doc, EditorRange::new(0, 2));
        assert_eq!(doc.formatted_runs("color"), vec![EditorRange::new(0, 2)]);
        assert!(doc.formatted_runs(FORMAT).is_empty());
    }
}
