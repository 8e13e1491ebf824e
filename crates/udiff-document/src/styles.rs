//! Style tags assigned to classified paragraphs.

use udiff_parser::LineType;

/// Logical style of a paragraph, derived from its line classification.
///
/// Tags are semantic; a renderer maps them to concrete colors or text
/// attributes. [`StyleTag::HunkLabel`] is never assigned to a whole
/// paragraph — it styles the free-text sub-range after a hunk header (often
/// a function signature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleTag {
    /// Default styling (context lines, unclassified text).
    #[default]
    Plain,
    Message,
    DiffCommand,
    FromFile,
    ToFile,
    Hunk,
    HunkLabel,
    DeletedLine,
    InsertedLine,
}

impl StyleTag {
    /// The style a paragraph of the given line type gets.
    pub fn for_line(line_type: LineType) -> StyleTag {
        match line_type {
            LineType::Message | LineType::Index => StyleTag::Message,
            LineType::DiffCmd => StyleTag::DiffCommand,
            LineType::FromFile => StyleTag::FromFile,
            LineType::ToFile => StyleTag::ToFile,
            LineType::Hunk => StyleTag::Hunk,
            LineType::Removed => StyleTag::DeletedLine,
            LineType::Added => StyleTag::InsertedLine,
            LineType::Context | LineType::NoNewlineAtEof => StyleTag::Plain,
        }
    }

    /// Stable name for style lookup by renderers.
    pub fn name(self) -> &'static str {
        match self {
            StyleTag::Plain => "default",
            StyleTag::Message => "message-text",
            StyleTag::DiffCommand => "diff-command",
            StyleTag::FromFile => "from-file",
            StyleTag::ToFile => "to-file",
            StyleTag::Hunk => "hunk",
            StyleTag::HunkLabel => "hunk-label",
            StyleTag::DeletedLine => "deleted-line",
            StyleTag::InsertedLine => "inserted-line",
        }
    }
}
