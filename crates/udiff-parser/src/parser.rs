//! The unified-diff line state machine.
//!
//! See the [Unified Format](https://www.gnu.org/software/diffutils/manual/html_node/Unified-Format.html)
//! and [Multiple Patches in a File](https://www.gnu.org/software/diffutils/manual/html_node/Multiple-Patches.html)
//! sections of the GNU Diffutils manual for the grammar this tracks.

use crate::types::{Classification, LineType};
use regex::Regex;

/// Mutable state of one parse session.
///
/// `from_line`/`to_line` are the current side line counters; a hunk header
/// seeds them with the 0-based start lines so the first body line increments
/// them to the advertised 1-based values. `from_remaining`/`to_remaining`
/// count the lines left to consume in the active hunk per side and never go
/// negative: an overlong hunk saturates to zero and falls out of hunk
/// tracking instead of desynchronizing the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserState {
    pub line_type: LineType,
    pub from_line: u32,
    pub to_line: u32,
    pub from_remaining: u32,
    pub to_remaining: u32,
}

impl ParserState {
    pub fn new() -> Self {
        Self {
            line_type: LineType::Message,
            from_line: 0,
            to_line: 0,
            from_remaining: 0,
            to_remaining: 0,
        }
    }

    /// Whether a hunk is still consuming lines on either side.
    pub fn in_hunk(&self) -> bool {
        self.from_remaining > 0 || self.to_remaining > 0
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies raw diff lines, one at a time, in source order.
///
/// The parser itself only holds the compiled patterns; all session state
/// lives in an explicit [`ParserState`], so one parser instance can serve
/// any number of concurrent sessions.
pub struct UDiffParser {
    index_line: Regex,
    diff_cmd: Regex,
    from_file: Regex,
    to_file: Regex,
    hunk: Regex,
}

impl UDiffParser {
    pub fn new() -> Self {
        // The file-header patterns stop at the first control character so
        // tab-separated timestamps and the line terminator stay outside the
        // term range.
        Self {
            index_line: Regex::new("^Index: [^\\x00-\\x1F]+").unwrap(),
            diff_cmd: Regex::new("^diff ").unwrap(),
            from_file: Regex::new("^--- [^\\x00-\\x1F]+").unwrap(),
            to_file: Regex::new("^\\+\\+\\+ [^\\x00-\\x1F]+").unwrap(),
            hunk: Regex::new("^@@ -([0-9]+)(?:,([0-9]+))? \\+([0-9]+)(?:,([0-9]+))? @@").unwrap(),
        }
    }

    /// Classifies `line` (terminator-inclusive) and advances `state`.
    ///
    /// Deterministic and total: any input falls through to
    /// [`LineType::Message`] rather than failing. Decision order, first
    /// match wins:
    ///
    /// 1. hunk header, from any state;
    /// 2. from `Message`: `diff `, `Index: `, `--- ` headers;
    /// 3. from `DiffCmd`/`Index`: `--- ` or back to `Message`;
    /// 4. from `FromFile`: `+++ ` or back to `Message`;
    /// 5. hunk body: context (empty or space-prefixed, while lines remain),
    ///    then `-` removed, then `+` added;
    /// 6. fresh block start mid-stream (`Index: `, `diff `, `--- `), which
    ///    resets the line counters;
    /// 7. `Message`, which also resets the line counters.
    pub fn classify(&self, state: &mut ParserState, line: &str) -> Classification {
        let mut term_start = 0;
        let mut term_end = line.len();

        if let Some(captures) = self.hunk.captures(line) {
            state.from_line = capture_number(&captures, 1).saturating_sub(1);
            state.from_remaining = captures.get(2).map_or(1, |_| capture_number(&captures, 2));
            state.to_line = capture_number(&captures, 3).saturating_sub(1);
            state.to_remaining = captures.get(4).map_or(1, |_| capture_number(&captures, 4));
            state.line_type = LineType::Hunk;
            term_end = captures.get(0).unwrap().end();
        } else if state.line_type == LineType::Message {
            if self.diff_cmd.is_match(line) {
                state.line_type = LineType::DiffCmd;
            } else if let Some(found) = self.index_line.find(line) {
                state.line_type = LineType::Index;
                term_start = "Index: ".len();
                term_end = found.end();
            } else if let Some(found) = self.from_file.find(line) {
                state.line_type = LineType::FromFile;
                term_start = "--- ".len();
                term_end = found.end();
            }
        } else if state.line_type == LineType::DiffCmd || state.line_type == LineType::Index {
            if let Some(found) = self.from_file.find(line) {
                state.line_type = LineType::FromFile;
                term_start = "--- ".len();
                term_end = found.end();
            } else {
                state.line_type = LineType::Message;
            }
        } else if state.line_type == LineType::FromFile {
            if let Some(found) = self.to_file.find(line) {
                state.line_type = LineType::ToFile;
                term_start = "+++ ".len();
                term_end = found.end();
            } else {
                state.line_type = LineType::Message;
            }
        } else if is_context(line) && state.in_hunk() {
            state.from_line += 1;
            state.from_remaining = state.from_remaining.saturating_sub(1);
            state.to_line += 1;
            state.to_remaining = state.to_remaining.saturating_sub(1);
            state.line_type = LineType::Context;
            term_start = 1;
        } else if line.starts_with('-') {
            state.from_line += 1;
            state.from_remaining = state.from_remaining.saturating_sub(1);
            state.line_type = LineType::Removed;
            term_start = 1;
        } else if line.starts_with('+') {
            state.to_line += 1;
            state.to_remaining = state.to_remaining.saturating_sub(1);
            state.line_type = LineType::Added;
            term_start = 1;
        } else if let Some(found) = self.index_line.find(line) {
            state.line_type = LineType::Index;
            term_start = "Index: ".len();
            term_end = found.end();
            state.from_line = 0;
            state.to_line = 0;
        } else if self.diff_cmd.is_match(line) {
            state.line_type = LineType::DiffCmd;
            state.from_line = 0;
            state.to_line = 0;
        } else if let Some(found) = self.from_file.find(line) {
            state.line_type = LineType::FromFile;
            term_start = "--- ".len();
            term_end = found.end();
            state.from_line = 0;
            state.to_line = 0;
        } else {
            state.from_line = 0;
            state.to_line = 0;
            state.line_type = LineType::Message;
        }

        Classification {
            line_type: state.line_type,
            from_line: state.from_line,
            to_line: state.to_line,
            term_start,
            term_end,
        }
    }
}

impl Default for UDiffParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a digit capture, saturating on overflow so classification stays
/// total over arbitrary input.
fn capture_number(captures: &regex::Captures<'_>, group: usize) -> u32 {
    captures
        .get(group)
        .map_or(0, |m| m.as_str().parse().unwrap_or(u32::MAX))
}

/// A context line is empty (apart from its terminator) or starts with a
/// space.
fn is_context(line: &str) -> bool {
    let content = strip_terminator(line);
    content.is_empty() || content.starts_with(' ')
}

/// The line without its trailing `\n`, `\r\n` or `\r`.
pub fn strip_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify_all(text: &str) -> Vec<Classification> {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        text.split_inclusive('\n')
            .map(|line| parser.classify(&mut state, line))
            .collect()
    }

    fn types(results: &[Classification]) -> Vec<LineType> {
        results.iter().map(|r| r.line_type).collect()
    }

    #[test]
    fn test_hunk_header_with_counts() {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        let result = parser.classify(&mut state, "@@ -9,3 +8,6 @@\n");

        assert_eq!(result.line_type, LineType::Hunk);
        assert_eq!(state.from_line, 8);
        assert_eq!(state.to_line, 7);
        assert_eq!(state.from_remaining, 3);
        assert_eq!(state.to_remaining, 6);
        assert_eq!(result.term_end, "@@ -9,3 +8,6 @@".len());
    }

    #[test]
    fn test_hunk_header_with_omitted_counts() {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        parser.classify(&mut state, "@@ -9 +8 @@\n");

        assert_eq!(state.from_line, 8);
        assert_eq!(state.to_line, 7);
        assert_eq!(state.from_remaining, 1);
        assert_eq!(state.to_remaining, 1);
    }

    #[test]
    fn test_hunk_label_stays_outside_term_range() {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        let line = "@@ -1,2 +1,2 @@ fn main()\n";
        let result = parser.classify(&mut state, line);

        assert_eq!(result.term(line), "@@ -1,2 +1,2 @@");
    }

    #[test]
    fn test_hunk_body_sequence() {
        let results = classify_all(
            "@@ -9,3 +8,6 @@\n context\n-removed\n+added\n+added2\n context\n",
        );

        assert_eq!(
            types(&results),
            vec![
                LineType::Hunk,
                LineType::Context,
                LineType::Removed,
                LineType::Added,
                LineType::Added,
                LineType::Context,
            ]
        );
        let from_lines: Vec<u32> = results.iter().map(|r| r.from_line).collect();
        let to_lines: Vec<u32> = results.iter().map(|r| r.to_line).collect();
        assert_eq!(from_lines, vec![8, 9, 10, 10, 10, 11]);
        assert_eq!(to_lines, vec![7, 8, 8, 9, 10, 11]);
    }

    #[test]
    fn test_header_chain() {
        let results = classify_all(
            "Index: foo.txt\ndiff -u a/foo.txt b/foo.txt\n--- a/foo.txt\n+++ b/foo.txt\n",
        );

        // "diff " resets the chain to DiffCmd after Index; "--- " follows.
        assert_eq!(
            types(&results),
            vec![
                LineType::Index,
                LineType::Message,
                LineType::FromFile,
                LineType::ToFile,
            ]
        );
    }

    #[test]
    fn test_from_file_term_skips_prefix() {
        let results = classify_all("--- a/foo.txt\n+++ b/foo.txt\n");
        assert_eq!(results[0].term("--- a/foo.txt\n"), "a/foo.txt");
        assert_eq!(results[1].term("+++ b/foo.txt\n"), "b/foo.txt");
    }

    #[test]
    fn test_from_file_term_stops_at_tab_timestamp() {
        let line = "--- a/foo.txt\t2024-01-15 10:30:00\n";
        let results = classify_all(line);
        assert_eq!(results[0].term(line), "a/foo.txt");
    }

    #[test]
    fn test_missing_to_file_degrades_to_message() {
        let results = classify_all("--- a/x.txt\nsome random text\n");
        assert_eq!(types(&results), vec![LineType::FromFile, LineType::Message]);
    }

    #[test]
    fn test_index_without_from_file_degrades_to_message() {
        let results = classify_all("Index: x.txt\nnot a header\n");
        assert_eq!(types(&results), vec![LineType::Index, LineType::Message]);
    }

    #[test]
    fn test_empty_line_inside_hunk_is_context() {
        let results = classify_all("@@ -1,3 +1,3 @@\n a\n\n b\n");
        assert_eq!(
            types(&results),
            vec![
                LineType::Hunk,
                LineType::Context,
                LineType::Context,
                LineType::Context,
            ]
        );
    }

    #[test]
    fn test_exhausted_hunk_falls_back_to_message() {
        let results = classify_all("@@ -1,1 +1,1 @@\n only\n trailing\n");
        assert_eq!(
            types(&results),
            vec![LineType::Hunk, LineType::Context, LineType::Message]
        );
    }

    #[test]
    fn test_fresh_index_after_hunk_resets_counters() {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        for line in ["@@ -5,1 +5,1 @@\n", " ctx\n", "Index: other.txt\n"] {
            parser.classify(&mut state, line);
        }
        assert_eq!(state.line_type, LineType::Index);
        assert_eq!(state.from_line, 0);
        assert_eq!(state.to_line, 0);
    }

    #[test]
    fn test_new_file_hunk_saturates_from_line() {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        parser.classify(&mut state, "@@ -0,0 +1,2 @@\n");
        assert_eq!(state.from_line, 0);
        assert_eq!(state.to_line, 0);
        assert_eq!(state.to_remaining, 2);
    }

    #[test]
    fn test_arbitrary_prose_is_message() {
        let results = classify_all("commit 1234\nAuthor: someone\n\nrefactor things\n");
        assert!(types(&results).iter().all(|t| *t == LineType::Message));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = "Index: a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1,2 +1,2 @@\n ctx\n-x\n+y\n";
        assert_eq!(classify_all(text), classify_all(text));
    }
}
