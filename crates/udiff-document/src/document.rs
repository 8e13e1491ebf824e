//! The annotated paragraph buffer.
//!
//! One paragraph per source line, terminator included, so concatenating all
//! paragraph spans reproduces the input byte for byte. Paragraph boundaries
//! are cached as start offsets; "paragraph containing offset X" is a binary
//! search. The buffer itself knows nothing about diff semantics — the
//! annotation engine writes style tags and attributes into it.

use std::ops::Range;
use std::sync::Arc;

use crate::styles::StyleTag;

/// Attributes attached to a paragraph by the annotation engine.
///
/// `from_line`/`to_line` are cached decimal strings; equal line numbers
/// across the two sides share one allocation.
#[derive(Debug, Clone, Default)]
pub struct ParagraphAttrs {
    /// Target file path of the enclosing file entry, on its anchor line.
    pub file: Option<String>,
    /// Line number in the original file; absent on pure additions.
    pub from_line: Option<Arc<str>>,
    /// Line number in the new file; absent on pure deletions.
    pub to_line: Option<Arc<str>>,
}

/// One logical line of the buffer.
#[derive(Debug, Clone)]
pub struct Paragraph {
    start: usize,
    style: StyleTag,
    /// Sub-range (relative to `start`) styled as a hunk label.
    label: Option<Range<usize>>,
    attrs: ParagraphAttrs,
    classified: bool,
}

impl Paragraph {
    fn new(start: usize) -> Self {
        Self {
            start,
            style: StyleTag::Plain,
            label: None,
            attrs: ParagraphAttrs::default(),
            classified: false,
        }
    }

    pub fn style(&self) -> StyleTag {
        self.style
    }

    /// Hunk-label sub-range, relative to the paragraph start.
    pub fn label(&self) -> Option<&Range<usize>> {
        self.label.as_ref()
    }

    pub fn attrs(&self) -> &ParagraphAttrs {
        &self.attrs
    }

    /// Whether this paragraph has been through the classifier. An
    /// incomplete trailing paragraph stays unclassified (default styling)
    /// until its line is fully known.
    pub fn is_classified(&self) -> bool {
        self.classified
    }
}

/// An append-only text buffer segmented into paragraphs at line
/// terminators (`\n`, `\r\n`, bare `\r`).
#[derive(Debug, Default)]
pub struct DiffDocument {
    text: String,
    paragraphs: Vec<Paragraph>,
}

impl DiffDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph(&self, index: usize) -> &Paragraph {
        &self.paragraphs[index]
    }

    /// Byte span of paragraph `index` within [`Self::text`].
    pub fn paragraph_span(&self, index: usize) -> Range<usize> {
        let start = self.paragraphs[index].start;
        let end = self
            .paragraphs
            .get(index + 1)
            .map_or(self.text.len(), |next| next.start);
        start..end
    }

    pub fn paragraph_text(&self, index: usize) -> &str {
        &self.text[self.paragraph_span(index)]
    }

    /// Index of the paragraph containing byte `offset`. Offsets at or past
    /// the end of the buffer resolve to the last paragraph.
    pub fn paragraph_at(&self, offset: usize) -> Option<usize> {
        if self.paragraphs.is_empty() {
            return None;
        }
        let index = self.paragraphs.partition_point(|p| p.start <= offset);
        Some(index - 1)
    }

    /// The nearest `FILE` attribute at or before `offset` — the file entry
    /// a given buffer position belongs to.
    pub fn file_at(&self, offset: usize) -> Option<&str> {
        let mut index = self.paragraph_at(offset)?;
        loop {
            if let Some(file) = self.paragraphs[index].attrs.file.as_deref() {
                return Some(file);
            }
            index = index.checked_sub(1)?;
        }
    }

    /// Whether paragraph `index` is terminator-complete. The trailing
    /// paragraph is complete once it ends in `\n`; a trailing bare `\r`
    /// stays provisional because the next chunk may turn it into `\r\n`.
    pub fn is_complete(&self, index: usize) -> bool {
        if index + 1 < self.paragraphs.len() {
            return true;
        }
        self.text.ends_with('\n')
    }

    /// Appends a chunk of text, extending the open trailing paragraph and
    /// creating new paragraphs at each confirmed terminator. Returns the
    /// byte range touched by the append.
    pub fn append(&mut self, chunk: &str) -> Range<usize> {
        let offset = self.text.len();
        if chunk.is_empty() {
            return offset..offset;
        }

        // An open trailing paragraph (no terminator yet, or a provisional
        // bare \r) absorbs the new text; otherwise the chunk starts a new
        // paragraph.
        let open_start = self
            .paragraphs
            .last()
            .filter(|last| !self.text[last.start..].ends_with('\n'))
            .map(|last| last.start);

        self.text.push_str(chunk);

        let scan_from = match open_start {
            Some(start) => start,
            None => {
                self.paragraphs.push(Paragraph::new(offset));
                offset
            }
        };

        let bytes = self.text.as_bytes();
        let mut i = scan_from;
        while i < bytes.len() {
            let boundary = match bytes[i] {
                b'\n' => Some(i + 1),
                b'\r' if i + 1 < bytes.len() => {
                    Some(if bytes[i + 1] == b'\n' { i + 2 } else { i + 1 })
                }
                _ => None,
            };
            match boundary {
                Some(end) => {
                    if end < bytes.len() {
                        self.paragraphs.push(Paragraph::new(end));
                    }
                    i = end;
                }
                None => i += 1,
            }
        }

        offset..self.text.len()
    }

    /// Discards all content and annotations.
    pub fn clear(&mut self) {
        self.text.clear();
        self.paragraphs.clear();
    }

    pub(crate) fn set_style(&mut self, index: usize, style: StyleTag) {
        self.paragraphs[index].style = style;
    }

    pub(crate) fn set_label(&mut self, index: usize, label: Range<usize>) {
        self.paragraphs[index].label = Some(label);
    }

    pub(crate) fn set_file(&mut self, index: usize, file: String) {
        self.paragraphs[index].attrs.file = Some(file);
    }

    pub(crate) fn set_line_numbers(
        &mut self,
        index: usize,
        from_line: Option<Arc<str>>,
        to_line: Option<Arc<str>>,
    ) {
        let attrs = &mut self.paragraphs[index].attrs;
        attrs.from_line = from_line;
        attrs.to_line = to_line;
    }

    pub(crate) fn mark_classified(&mut self, index: usize) {
        self.paragraphs[index].classified = true;
    }
}
