//! Directive-annotated source documents for dox.
//!
//! A source document is a markdown file whose head may carry a directive
//! header and must carry a `# ` title:
//!
//! ```text
//! <!-- dox: 98765, omit-notice -->
//! # Deployment guide
//!
//! Body rendered to Confluence storage format.
//! ```
//!
//! The crate provides:
//! - [`Source`]: the closed set of document kinds (file-backed markdown and
//!   the synthesized default root)
//! - [`Directives`]: parsed header tokens
//! - [`parse`]: the header/preamble/title/body scanner
//! - [`markdown_to_xhtml`] and [`notice_banner`]: rendering helpers
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dox_source::{ParseOptions, Source};
//!
//! let mut doc = Source::open(Path::new("docs/guide.md"), ParseOptions::default())?;
//! if doc.identity().is_none() {
//!     doc.set_identity("98765")?;
//! }
//! ```

mod directive;
mod error;
mod markdown;
mod parser;
mod render;
mod root;
mod source;

pub use directive::{DIRECTIVE_MARKER, Directives, IGNORE, OMIT_NOTICE, header_payload, is_identity};
pub use error::SourceError;
pub use markdown::{MARKDOWN_EXTENSIONS, MarkdownSource, ROOT_FILENAME};
pub use parser::{ParseOptions, ParsedDocument, parse};
pub use render::{NOTICE_TITLE, markdown_to_xhtml, notice_banner};
pub use root::DefaultRoot;
pub use source::Source;
