//! The annotation engine: turns classification results into paragraph
//! styles and attributes.

use std::collections::HashMap;
use std::sync::Arc;

use udiff_parser::{Classification, LineType};

use crate::document::DiffDocument;
use crate::outline::OutlineSink;
use crate::styles::StyleTag;

const DEV_NULL: &str = "/dev/null";

/// Per-session annotation state.
///
/// Carries the one-slot "previous paragraph" handle needed to patch the
/// file attribute retroactively: a file's identity is only known once the
/// `+++` line of its `---`/`+++` header pair is seen (renames). The handle
/// is a paragraph index, not a reference, so it stays valid as the buffer
/// grows.
#[derive(Debug, Default)]
pub struct Annotator {
    previous: Option<usize>,
    /// From-file path awaiting confirmation by the matching `+++` line.
    pending_file: Option<String>,
    /// Decimal strings keyed by line number; both sides share entries.
    line_numbers: HashMap<u32, Arc<str>>,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one classification result to paragraph `index`, in line
    /// order. `line` is the paragraph's text (terminator included).
    pub fn annotate(
        &mut self,
        doc: &mut DiffDocument,
        index: usize,
        result: &Classification,
        line: &str,
        outline: &mut dyn OutlineSink,
    ) {
        doc.set_style(index, StyleTag::for_line(result.line_type));

        match result.line_type {
            LineType::Hunk => {
                // Free text after the closing @@ is a label (usually the
                // enclosing function), styled separately.
                if result.term_end < line.len() {
                    doc.set_label(index, result.term_end..line.len());
                }
            }
            LineType::FromFile => {
                // Not committed yet: the definitive path is only known once
                // the matching +++ line is seen (renames).
                let file = result.term(line);
                self.pending_file = if file.starts_with(DEV_NULL) {
                    None
                } else {
                    Some(file.strip_prefix("a/").unwrap_or(file).to_string())
                };
            }
            LineType::ToFile => {
                let file = result.term(line);
                let resolved = if file.starts_with(DEV_NULL) {
                    // Deleted file: fall back to the from-file path.
                    self.pending_file.take()
                } else {
                    self.pending_file = None;
                    Some(file.strip_prefix("b/").unwrap_or(file).to_string())
                };
                // The from-file paragraph anchors the file entry for
                // outline and navigation purposes.
                if let (Some(path), Some(previous)) = (resolved, self.previous) {
                    doc.set_file(previous, path.clone());
                    outline.add_path(&path);
                }
            }
            LineType::Context | LineType::Added | LineType::Removed => {
                let from_line = (result.line_type != LineType::Added)
                    .then(|| self.line_number(result.from_line));
                let to_line = (result.line_type != LineType::Removed)
                    .then(|| self.line_number(result.to_line));
                doc.set_line_numbers(index, from_line, to_line);
            }
            LineType::Message | LineType::Index | LineType::DiffCmd | LineType::NoNewlineAtEof => {}
        }

        self.previous = Some(index);
    }

    fn line_number(&mut self, number: u32) -> Arc<str> {
        self.line_numbers
            .entry(number)
            .or_insert_with(|| Arc::from(number.to_string()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::NullOutline;
    use pretty_assertions::assert_eq;
    use udiff_parser::{ParserState, UDiffParser};

    fn annotate_all(text: &str) -> DiffDocument {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        let mut annotator = Annotator::new();
        let mut outline = NullOutline;
        let mut doc = DiffDocument::new();
        doc.append(text);
        for index in 0..doc.paragraph_count() {
            let line = doc.paragraph_text(index).to_string();
            let result = parser.classify(&mut state, &line);
            annotator.annotate(&mut doc, index, &result, &line, &mut outline);
        }
        doc
    }

    #[test]
    fn test_hunk_label_range() {
        let doc = annotate_all("@@ -1,2 +1,2 @@ fn main()\n");
        let paragraph = doc.paragraph(0);
        assert_eq!(paragraph.style(), StyleTag::Hunk);
        let label = paragraph.label().unwrap().clone();
        assert_eq!(&doc.paragraph_text(0)[label], " fn main()\n");
    }

    #[test]
    fn test_hunk_without_label_has_no_range() {
        let doc = annotate_all("@@ -1,2 +1,2 @@");
        assert_eq!(doc.paragraph(0).label(), None);
    }

    #[test]
    fn test_to_file_commits_path_to_previous_paragraph() {
        let doc = annotate_all("--- a/foo.txt\n+++ b/foo.txt\n");
        assert_eq!(doc.paragraph(0).attrs().file.as_deref(), Some("foo.txt"));
        assert_eq!(doc.paragraph(1).attrs().file, None);
    }

    #[test]
    fn test_rename_keeps_to_file_path() {
        let doc = annotate_all("--- a/old.rs\n+++ b/new.rs\n");
        assert_eq!(doc.paragraph(0).attrs().file.as_deref(), Some("new.rs"));
    }

    #[test]
    fn test_dev_null_from_file_still_gets_target_path() {
        let doc = annotate_all("--- /dev/null\n+++ b/new.txt\n");
        assert_eq!(doc.paragraph(0).attrs().file.as_deref(), Some("new.txt"));
    }

    #[test]
    fn test_deleted_file_keeps_from_path() {
        let doc = annotate_all("--- a/gone.txt\n+++ /dev/null\n");
        assert_eq!(doc.paragraph(0).attrs().file.as_deref(), Some("gone.txt"));
    }

    #[test]
    fn test_line_number_attributes() {
        let doc =
            annotate_all("@@ -9,3 +8,6 @@\n context\n-removed\n+added\n+added2\n context\n");

        let attrs = |i: usize| {
            let a = doc.paragraph(i).attrs();
            (
                a.from_line.as_deref().map(str::to_string),
                a.to_line.as_deref().map(str::to_string),
            )
        };

        // Hunk headers carry no line numbers.
        assert_eq!(attrs(0), (None, None));
        assert_eq!(attrs(1), (Some("9".into()), Some("8".into())));
        assert_eq!(attrs(2), (Some("10".into()), None));
        assert_eq!(attrs(3), (None, Some("9".into())));
        assert_eq!(attrs(4), (None, Some("10".into())));
        assert_eq!(attrs(5), (Some("11".into()), Some("11".into())));
    }

    #[test]
    fn test_equal_line_numbers_share_allocation() {
        let doc = annotate_all("@@ -3,1 +3,1 @@\n same\n");
        let attrs = doc.paragraph(1).attrs();
        let from = attrs.from_line.as_ref().unwrap();
        let to = attrs.to_line.as_ref().unwrap();
        assert!(Arc::ptr_eq(from, to));
    }

    #[test]
    fn test_outline_receives_one_path_per_header_pair() {
        let parser = UDiffParser::new();
        let mut state = ParserState::new();
        let mut annotator = Annotator::new();
        let mut outline = crate::outline::OutlineTree::new();
        let mut doc = DiffDocument::new();
        doc.append("--- a/foo.txt\n+++ b/foo.txt\n@@ -1 +1 @@\n-x\n+y\n");
        for index in 0..doc.paragraph_count() {
            let line = doc.paragraph_text(index).to_string();
            let result = parser.classify(&mut state, &line);
            annotator.annotate(&mut doc, index, &result, &line, &mut outline);
        }
        assert_eq!(outline.paths(), vec!["foo.txt"]);
    }

    #[test]
    fn test_missing_to_file_leaves_no_committed_path() {
        let doc = annotate_all("--- a/x.txt\nsome random text\n");
        assert_eq!(doc.paragraph(0).style(), StyleTag::FromFile);
        assert_eq!(doc.paragraph(1).style(), StyleTag::Message);
        // The orphaned header's candidate path is never committed.
        assert_eq!(doc.paragraph(0).attrs().file, None);
        assert_eq!(doc.paragraph(1).attrs().file, None);
    }
}
