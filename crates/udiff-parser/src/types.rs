//! Type definitions for unified-diff line classification

use serde::{Deserialize, Serialize};

/// Classification of a single diff line.
///
/// Variants are ordered roughly by detection priority. See
/// [`UDiffParser::classify`](crate::UDiffParser::classify) for the exact
/// decision order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// Free text outside any recognized diff structure.
    Message,
    /// A file-identifying header line (`Index: path`).
    Index,
    /// A `diff ...` command invocation line.
    DiffCmd,
    /// The `--- ` (original file) header line.
    FromFile,
    /// The `+++ ` (new file) header line.
    ToFile,
    /// A `@@ -a,b +c,d @@` hunk header.
    Hunk,
    /// An unchanged line inside a hunk.
    Context,
    /// An added line (`+...`).
    Added,
    /// A removed line (`-...`).
    Removed,
    /// The `\ No newline at end of file` marker.
    ///
    /// Reserved in the vocabulary; no classifier rule produces it yet.
    NoNewlineAtEof,
}

impl LineType {
    /// Whether this line belongs to a hunk body (carries side line numbers).
    pub fn in_hunk_body(self) -> bool {
        matches!(self, LineType::Context | LineType::Added | LineType::Removed)
    }
}

/// Result of classifying one raw line.
///
/// `from_line`/`to_line` are the 1-based side line numbers for hunk-body
/// lines (0 when not applicable). `term_start..term_end` is the byte range
/// of the semantically relevant substring of the line: the file-name portion
/// after `--- `/`+++ `, the header span of a hunk line before any trailing
/// label, or the payload after the `+`/`-`/space marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub line_type: LineType,
    pub from_line: u32,
    pub to_line: u32,
    pub term_start: usize,
    pub term_end: usize,
}

impl Classification {
    /// The term range applied to `line`, as a string slice.
    pub fn term<'a>(&self, line: &'a str) -> &'a str {
        &line[self.term_start..self.term_end.min(line.len())]
    }
}
