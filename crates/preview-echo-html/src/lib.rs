//! # preview-echo-html
//!
//! The markup layer under the preview: a tokenizer, an arena node tree,
//! a serializer and an allow-list sanitizer for the sanitized HTML the
//! preview renders.
//!
//! ## Pipeline
//!
//! ```text
//! HTML string → Lexer → Tokens → TreeBuilder → Tree → Serializer → HTML string
//!               (Logos)                        │
//!                                              └── sanitize_tree (allow-list)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! preview-echo-html/
//! ├── lib.rs        # This file - public API
//! ├── error.rs      # HtmlError
//! ├── lexer.rs      # Logos-based tokenizer
//! ├── parser.rs     # Forgiving tree builder (void elements, implied ends)
//! ├── tree.rs       # Arena of nodes addressed by NodeId
//! ├── serialize.rs  # Tree back to markup, entity-encoded
//! └── sanitize.rs   # SanitizePolicy and sanitize()
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use preview_echo_html::{parse, sanitize, to_html, SanitizePolicy};
//!
//! let tree = parse("<p>Hello <b>world</b></p>").unwrap();
//! assert_eq!(tree.text_content(tree.root()), "Hello world");
//! assert_eq!(to_html(&tree), "<p>Hello <b>world</b></p>");
//!
//! let clean = sanitize("<p onclick=\"x()\">hi<script>1</script></p>", &SanitizePolicy::default());
//! assert_eq!(clean, "<p>hi</p>");
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod sanitize;
pub mod serialize;
pub mod tree;

pub use error::HtmlError;
pub use parser::parse;
pub use sanitize::{ANY_TAG, SanitizePolicy, sanitize, sanitize_tree};
pub use serialize::{inner_html, outer_html, to_html};
pub use tree::{Attribute, NodeId, NodeKind, Tree};
