//! Narrow traits over everything the engine needs from its host: the
//! native selection, the rich-text editor, the preview viewport and the
//! content commit target.

use std::collections::BTreeMap;

use preview_echo_html::SanitizePolicy;
use serde::Serialize;

use crate::{error::HostError, models::EditorRange, search::MatchHandle};

pub mod memory;

pub use memory::{DocumentCall, MemoryDocument, MemorySink, RecordingViewport, StaticSelection};

/// One end of a native selection: a node and a char offset within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundaryPoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> BoundaryPoint<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A native selection in the preview, with the string the host reports for
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionRange<N> {
    pub start: BoundaryPoint<N>,
    pub end: BoundaryPoint<N>,
    pub text: String,
}

impl<N: PartialEq> SelectionRange<N> {
    pub fn new(start: BoundaryPoint<N>, end: BoundaryPoint<N>, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The host's selection API for the preview.
pub trait TextSelectionSource {
    type Node;

    /// The first range of the current selection, if there is one.
    fn current_range(&self) -> Result<Option<SelectionRange<Self::Node>>, HostError>;

    /// Remove every range from the selection.
    fn clear(&mut self) -> Result<(), HostError>;
}

/// Effective formats over a span, by format name.
pub type Formats = BTreeMap<String, String>;

/// The editable rich-text document.
///
/// Ranges are in editor chars. Implementations clamp out-of-bounds ranges
/// to the document the way rich-text editors do.
pub trait RichTextDocument {
    /// The whole document as plain text.
    fn text(&self) -> Result<String, HostError>;

    fn format_text(&mut self, range: EditorRange, name: &str, value: &str) -> Result<(), HostError>;

    fn remove_format(&mut self, range: EditorRange, name: &str) -> Result<(), HostError>;

    /// Formats applied uniformly across `range`.
    fn format_at(&self, range: EditorRange) -> Result<Formats, HostError>;

    fn set_selection(&mut self, index: usize, length: usize) -> Result<(), HostError>;

    fn focus(&mut self) -> Result<(), HostError>;
}

/// The scrollable container the preview renders into.
pub trait PreviewViewport {
    fn scroll_into_view(&mut self, handle: MatchHandle) -> Result<(), HostError>;
}

/// Where debounced editor content goes.
pub trait CommitSink {
    fn commit(&mut self, content: &str) -> Result<(), HostError>;
}

/// The allow-list sanitizer the preview renders through.
pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;

    /// Whether `<tag class="class">` comes out of [`Sanitizer::sanitize`]
    /// with the element and the class intact.
    fn keeps_class(&self, tag: &str, class: &str) -> bool;
}

impl Sanitizer for SanitizePolicy {
    fn sanitize(&self, html: &str) -> String {
        preview_echo_html::sanitize(html, self)
    }

    fn keeps_class(&self, tag: &str, class: &str) -> bool {
        self.allows_tag(tag) && self.allows_attr(tag, "class") && self.allows_class(class)
    }
}
