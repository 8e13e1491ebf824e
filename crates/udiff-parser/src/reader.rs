//! Terminator-inclusive line segmentation over a byte stream.

use std::io::Read;
use thiserror::Error;

/// Errors that can occur while segmenting a source into lines.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read from diff source: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8 in diff source")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const INITIAL_CAPACITY: usize = 16 * 1024;
const GROW_BY: usize = 1024;

/// Splits a byte stream into lines, keeping the line terminator attached.
///
/// Unlike `BufRead::read_line` this recognizes `\n`, `\r\n` and bare `\r`
/// terminators, and returns each one as part of its line so that downstream
/// offset bookkeeping sees every source byte exactly once. The final line is
/// returned without a terminator if the source ends without one.
///
/// Terminator sequences split across reads are handled by buffering: a `\r`
/// as the last buffered byte is not emitted until the next read confirms
/// whether a `\n` follows. UTF-8 is validated per complete line, so
/// multi-byte sequences split across reads never fail conversion.
pub struct LineReader<R> {
    source: R,
    buffer: Vec<u8>,
    pos: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: vec![0; INITIAL_CAPACITY],
            pos: 0,
            end: 0,
            eof: false,
        }
    }

    /// Returns the next line, or `None` once the source is exhausted and the
    /// buffer is drained.
    pub fn next_line(&mut self) -> Result<Option<String>, ReadError> {
        let eol = loop {
            if let Some(eol) = self.scan_terminator() {
                break eol;
            }
            if self.eof {
                // Unterminated trailing line (possibly ending in a bare \r).
                break self.end;
            }
            self.read_more()?;
        };

        if eol == self.pos {
            return Ok(None);
        }

        let line = String::from_utf8(self.buffer[self.pos..eol].to_vec())?;
        self.pos = eol;
        Ok(Some(line))
    }

    /// Looks for a confirmed terminator in the buffered bytes. A trailing
    /// `\r` is only a confirmed terminator once end-of-stream is known.
    fn scan_terminator(&self) -> Option<usize> {
        let buf = &self.buffer[..self.end];
        for i in self.pos..self.end {
            match buf[i] {
                b'\n' => return Some(i + 1),
                b'\r' => {
                    if i + 1 < self.end {
                        return Some(if buf[i + 1] == b'\n' { i + 2 } else { i + 1 });
                    }
                    if self.eof {
                        return Some(i + 1);
                    }
                    return None; // may still be the first half of \r\n
                }
                _ => {}
            }
        }
        None
    }

    fn read_more(&mut self) -> Result<(), ReadError> {
        if self.eof {
            return Ok(());
        }

        // Compact consumed bytes to the front before growing.
        if self.pos > 0 && self.pos < self.end {
            self.buffer.copy_within(self.pos..self.end, 0);
            self.end -= self.pos;
            self.pos = 0;
        } else if self.pos == self.end {
            self.pos = 0;
            self.end = 0;
        }

        if self.buffer.len() < self.end + GROW_BY {
            self.buffer.resize(self.buffer.len() + GROW_BY, 0);
        }

        loop {
            match self.source.read(&mut self.buffer[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(count) => {
                    self.end += count;
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
