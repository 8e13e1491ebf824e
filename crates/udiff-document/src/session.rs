//! Parse sessions: the single mutation entry point for a document.
//!
//! A session bundles the classifier state, the annotation engine and the
//! outline sink for one bounded pass over a source. Exactly one thread owns
//! a session; mutation from any other thread is an error, never silent
//! corruption.

use std::io::Read;
use std::thread::{self, ThreadId};

use thiserror::Error;
use udiff_parser::{LineReader, ParserState, ReadError, UDiffParser};

use crate::annotate::Annotator;
use crate::document::DiffDocument;
use crate::outline::OutlineSink;

/// Errors produced by parse-session mutation.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("parse session owned by thread {owner:?} mutated from thread {caller:?}")]
    OwnershipViolation { owner: ThreadId, caller: ThreadId },

    #[error(transparent)]
    Read(#[from] ReadError),
}

/// One parse session over a [`DiffDocument`].
///
/// Created with [`ParseSession::new`], fed either a whole source
/// ([`parse_reader`](Self::parse_reader)) or incremental chunks
/// ([`append`](Self::append)), and ended with [`finish`](Self::finish) or
/// [`cancel`](Self::cancel), both of which hand the document and sink back.
///
/// In streaming mode only terminator-complete paragraphs are classified;
/// the trailing incomplete paragraph keeps default styling until its line
/// is fully known. No partial classification is ever committed.
pub struct ParseSession<S: OutlineSink> {
    doc: DiffDocument,
    parser: UDiffParser,
    state: ParserState,
    annotator: Annotator,
    outline: S,
    owner: ThreadId,
}

impl<S: OutlineSink> ParseSession<S> {
    /// Starts a session over `doc`, opening an outline batch. The calling
    /// thread becomes the session owner.
    pub fn new(mut doc: DiffDocument, mut outline: S) -> Self {
        doc.clear();
        outline.start_batch();
        Self {
            doc,
            parser: UDiffParser::new(),
            state: ParserState::new(),
            annotator: Annotator::new(),
            outline,
            owner: thread::current().id(),
        }
    }

    pub fn document(&self) -> &DiffDocument {
        &self.doc
    }

    /// Bulk mode: reads `source` to exhaustion, classifying every line.
    pub fn parse_reader<R: Read>(&mut self, source: R) -> Result<(), DocumentError> {
        let mut reader = LineReader::new(source);
        while let Some(line) = reader.next_line()? {
            self.append(&line)?;
        }
        Ok(())
    }

    /// Streaming mode: appends `chunk` and classifies every newly
    /// line-complete paragraph, stopping at the first paragraph whose
    /// trailing text may still grow.
    pub fn append(&mut self, chunk: &str) -> Result<(), DocumentError> {
        self.check_owner()?;
        if chunk.is_empty() {
            return Ok(());
        }

        let touched = self.doc.append(chunk);
        let Some(start) = self.doc.paragraph_at(touched.start) else {
            return Ok(());
        };
        for index in start..self.doc.paragraph_count() {
            if self.doc.paragraph(index).is_classified() {
                continue;
            }
            if !self.doc.is_complete(index) {
                break;
            }
            self.classify_paragraph(index);
        }
        Ok(())
    }

    /// Ends the session: classifies the trailing unterminated line, if
    /// any, closes the outline batch and returns the annotated document.
    pub fn finish(mut self) -> Result<(DiffDocument, S), DocumentError> {
        self.check_owner()?;
        let count = self.doc.paragraph_count();
        if count > 0 && !self.doc.paragraph(count - 1).is_classified() {
            self.classify_paragraph(count - 1);
        }
        self.outline.end_batch();
        log::debug!(
            "parse session finished: {} paragraphs, {} bytes",
            self.doc.paragraph_count(),
            self.doc.len()
        );
        Ok((self.doc, self.outline))
    }

    /// Abandons the session, leaving the document at its last
    /// fully-committed paragraph boundary. Already-committed annotations
    /// are never rolled back; the incomplete trailing paragraph stays
    /// unclassified.
    pub fn cancel(mut self) -> (DiffDocument, S) {
        self.outline.end_batch();
        (self.doc, self.outline)
    }

    fn classify_paragraph(&mut self, index: usize) {
        let line = self.doc.paragraph_text(index).to_string();
        let result = self.parser.classify(&mut self.state, &line);
        self.annotator
            .annotate(&mut self.doc, index, &result, &line, &mut self.outline);
        self.doc.mark_classified(index);
    }

    fn check_owner(&self) -> Result<(), DocumentError> {
        let caller = thread::current().id();
        if caller != self.owner {
            return Err(DocumentError::OwnershipViolation {
                owner: self.owner,
                caller,
            });
        }
        Ok(())
    }
}

/// Convenience: bulk-parses `text` into a fresh document with the given
/// outline sink.
pub fn parse_str<S: OutlineSink>(text: &str, outline: S) -> (DiffDocument, S) {
    let mut session = ParseSession::new(DiffDocument::new(), outline);
    session
        .append(text)
        .expect("owner thread cannot violate ownership");
    session
        .finish()
        .expect("owner thread cannot violate ownership")
}
