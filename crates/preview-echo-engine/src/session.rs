//! The interaction session: entry points the host calls from its event
//! handlers, and the error channel they publish to.

use preview_echo_html::SanitizePolicy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorMessage, SearchError, SelectionError},
    highlight::{HighlightManager, HighlightStyle},
    host::{PreviewViewport, RichTextDocument, TextSelectionSource},
    models::{EditorRange, SelectionDescriptor},
    resolve::{FallbackPolicy, PositionResolver},
    search::{SearchHighlighter, SearchOutcome, SearchStyle},
    selection::{BlockTags, DomView, SelectionExtractor},
};

/// Everything a session can be configured with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub blocks: BlockTags,
    pub sanitize: SanitizePolicy,
    pub search: SearchStyle,
    pub highlight: HighlightStyle,
    pub resolver: FallbackPolicy,
}

pub struct PreviewSession {
    extractor: SelectionExtractor,
    resolver: PositionResolver,
    highlights: HighlightManager,
    search: SearchHighlighter,
    error: Option<ErrorMessage>,
}

impl PreviewSession {
    pub fn new(options: SessionOptions) -> Result<Self, SearchError> {
        Ok(Self {
            extractor: SelectionExtractor::new(options.blocks),
            resolver: PositionResolver::new(options.resolver),
            highlights: HighlightManager::new(options.highlight),
            search: SearchHighlighter::new(options.search, options.sanitize)?,
            error: None,
        })
    }

    /// The last user-facing error, if the last attempt produced one.
    pub fn error(&self) -> Option<&ErrorMessage> {
        self.error.as_ref()
    }

    pub fn highlights(&self) -> &HighlightManager {
        &self.highlights
    }

    pub fn search(&self) -> &SearchHighlighter {
        &self.search
    }

    /// A new selection gesture began.
    pub fn on_selection_start(&mut self) {
        self.error = None;
    }

    /// A selection gesture ended: describe it, find it in the editor and
    /// highlight it there.
    ///
    /// On success the preview selection is cleared and the highlighted range
    /// returned. Failures go to the error channel, except an empty selection
    /// which is silent.
    pub fn on_selection_end<V, S, D>(
        &mut self,
        dom: &V,
        selection: &mut S,
        doc: &mut D,
    ) -> Option<EditorRange>
    where
        V: DomView + ?Sized,
        S: TextSelectionSource<Node = V::Node> + ?Sized,
        D: RichTextDocument + ?Sized,
    {
        let range = match selection.current_range() {
            Ok(Some(range)) => range,
            Ok(None) => {
                self.error = None;
                return None;
            }
            Err(err) => {
                log::warn!("session: could not read the preview selection: {err}");
                return None;
            }
        };

        let descriptor = match self.extractor.extract(dom, &range) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                self.report(err);
                return None;
            }
        };

        let resolved = self.on_selection_resolved(&descriptor, doc).ok().flatten()?;
        if let Err(err) = selection.clear() {
            log::warn!("session: could not clear the preview selection: {err}");
        }
        Some(resolved)
    }

    /// Locate `descriptor` in the editor and highlight it.
    ///
    /// `Ok(None)` means the editor could not be read or formatted. That is
    /// logged but not published on the error channel.
    pub fn on_selection_resolved<D>(
        &mut self,
        descriptor: &SelectionDescriptor,
        doc: &mut D,
    ) -> Result<Option<EditorRange>, ErrorMessage>
    where
        D: RichTextDocument + ?Sized,
    {
        let full_text = match doc.text() {
            Ok(text) => text,
            Err(err) => {
                log::warn!("session: could not read editor text: {err}");
                return Ok(None);
            }
        };

        let range = self
            .resolver
            .resolve(descriptor, &full_text)
            .map_err(|err| self.report(err))?;
        self.error = None;
        if !self.highlights.apply_highlight(doc, range) {
            log::debug!("session: {range:?} resolved but not highlighted");
            return Ok(None);
        }
        Ok(Some(range))
    }

    /// Run cursor and focus work queued by the last highlight. Call on the
    /// host's next paint tick.
    pub fn flush_deferred<D>(&mut self, doc: &mut D)
    where
        D: RichTextDocument + ?Sized,
    {
        self.highlights.flush_deferred(doc);
    }

    pub fn clear_highlight<D>(&mut self, doc: &mut D)
    where
        D: RichTextDocument + ?Sized,
    {
        self.highlights.clear_highlight(doc);
    }

    pub fn on_search_term_changed(&mut self, html: &str, term: &str) -> SearchOutcome {
        self.search.highlight(html, term)
    }

    pub fn next_match<V>(&mut self, viewport: &mut V) -> Option<usize>
    where
        V: PreviewViewport + ?Sized,
    {
        self.search.next(viewport)
    }

    pub fn previous_match<V>(&mut self, viewport: &mut V) -> Option<usize>
    where
        V: PreviewViewport + ?Sized,
    {
        self.search.previous(viewport)
    }

    fn report(&mut self, err: SelectionError) -> ErrorMessage {
        let message = ErrorMessage::from(err);
        if err.is_silent() {
            self.error = None;
        } else {
            log::debug!("session: {message}");
            self.error = Some(message.clone());
        }
        message
    }
}
