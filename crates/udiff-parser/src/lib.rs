//! # udiff-parser
//!
//! A streaming, best-effort lexical classifier for unified-diff ("patch")
//! text, in the format produced by `diff -u`, `git diff` and friends.
//!
//! ## Design Principles
//!
//! The classifier is a single-pass state machine over whole lines. It never
//! fails on malformed input: every rule has a fallback to [`LineType::Message`]
//! so arbitrary text degrades to unstyled prose instead of an error. It also
//! does not validate diff semantics (hunk line counts are tracked, not
//! verified against content).
//!
//! Parser state is an explicit value ([`ParserState`]) passed into
//! [`UDiffParser::classify`] rather than hidden mutable fields, so a parse
//! session can be reset or cancelled by dropping the state, and unit tests
//! can drive the machine line by line.
//!
//! ## Usage
//!
//! ```rust
//! use udiff_parser::{LineReader, LineType, ParserState, UDiffParser};
//!
//! let source = "--- a/foo.txt\n+++ b/foo.txt\n@@ -1,2 +1,2 @@\n";
//! let parser = UDiffParser::new();
//! let mut state = ParserState::new();
//! let mut reader = LineReader::new(source.as_bytes());
//!
//! while let Some(line) = reader.next_line().unwrap() {
//!     let result = parser.classify(&mut state, &line);
//!     if result.line_type == LineType::Hunk {
//!         assert_eq!((result.from_line, result.to_line), (0, 0));
//!     }
//! }
//! ```

pub mod parser;
pub mod reader;
pub mod types;

pub use parser::{ParserState, UDiffParser};
pub use reader::{LineReader, ReadError};
pub use types::{Classification, LineType};
