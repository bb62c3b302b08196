//! # preview-echo-engine
//!
//! Maps a selection made in a rendered, sanitized preview back onto the
//! editable rich-text document the preview was produced from, and runs
//! free-text search over the preview.
//!
//! ## Pipelines
//!
//! ```text
//! selection ─► SelectionExtractor ─► PositionResolver ─► HighlightManager
//!              (block + offsets)     (editor range)      (format, defer cursor)
//!
//! search term ─► SearchHighlighter ─► MatchList ─► next / previous
//!                (mark, re-sanitize)
//! ```
//!
//! Both share the whitespace normalizer in [`text`]. [`PreviewSession`] wires
//! them to the host through the traits in [`host`].
//!
//! ## Example
//!
//! ```
//! use preview_echo_engine::{EditorRange, PositionResolver, SelectionDescriptor};
//!
//! let descriptor = SelectionDescriptor::new("Hello there.", 6, 5, "there");
//! let range = PositionResolver::default()
//!     .resolve(&descriptor, "Hello world. Hello there.")
//!     .unwrap();
//! assert_eq!(range, EditorRange::new(19, 5));
//! ```

pub mod commit;
pub mod error;
pub mod highlight;
pub mod host;
pub mod models;
pub mod resolve;
pub mod search;
pub mod selection;
pub mod session;
pub mod text;

pub use commit::{CommitOptions, DEFAULT_DEBOUNCE, DebouncedCommit, Debouncer};
pub use error::{ErrorKind, ErrorMessage, HostError, SearchError, SelectionError};
pub use highlight::{DeferredAction, HighlightManager, HighlightStyle};
pub use host::{
    BoundaryPoint, CommitSink, Formats, PreviewViewport, RichTextDocument, Sanitizer,
    SelectionRange, TextSelectionSource,
};
pub use models::{EditorRange, SelectionDescriptor};
pub use resolve::{FallbackPolicy, PositionResolver};
pub use search::{MatchHandle, MatchList, SearchHighlighter, SearchOutcome, SearchStyle};
pub use selection::{BlockTags, DomView, LeafIndex, SelectionExtractor};
pub use session::{PreviewSession, SessionOptions};
pub use text::{NormalizedText, normalize};
