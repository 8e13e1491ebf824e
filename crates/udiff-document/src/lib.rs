//! # udiff-document
//!
//! An annotated, incrementally growing text buffer for unified-diff text,
//! built on the line classifier from `udiff-parser`.
//!
//! ## Design Principles
//!
//! The document is **instrumented** — it holds text, per-paragraph style
//! tags and attributes, and notifies an [`OutlineSink`] about discovered
//! file entries instead of driving any UI directly. A renderer reads
//! paragraph styles and the `FILE`/`FROM_LINE`/`TO_LINE` attributes to
//! paint gutters and highlight lines; this crate owns no presentation.
//!
//! ## Parse sessions
//!
//! All mutation goes through a [`ParseSession`], which bundles the
//! classifier state, the annotation engine and the outline sink for one
//! bounded pass over a source. Sessions support two modes:
//!
//! - **Bulk**: [`ParseSession::parse_reader`] consumes a whole source.
//! - **Streaming**: [`ParseSession::append`] accepts arbitrary-sized text
//!   chunks; only terminator-complete paragraphs are classified, so a line
//!   split across chunks is never half-committed.
//!
//! A session asserts single-writer discipline at runtime: mutations from a
//! thread other than the session's creator are rejected with
//! [`DocumentError::OwnershipViolation`].
//!
//! [`DiffLoader`] runs a bulk session on a background thread and delivers
//! a single [`LoadOutcome`] notification, with cooperative cancellation.

pub mod annotate;
pub mod document;
pub mod loader;
pub mod outline;
pub mod session;
pub mod styles;

pub use annotate::Annotator;
pub use document::{DiffDocument, Paragraph, ParagraphAttrs};
pub use loader::{DiffLoader, LoadOutcome};
pub use outline::{NullOutline, OutlineSink, OutlineTree};
pub use session::{parse_str, DocumentError, ParseSession};
pub use styles::StyleTag;
