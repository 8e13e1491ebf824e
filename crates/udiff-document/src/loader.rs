//! Background loading of diff sources.
//!
//! Parsing runs off the caller's thread so large diffs do not block
//! interactive use. Completion, failure and cancellation are delivered as a
//! single [`LoadOutcome`] over a channel — no polling, no partial
//! interleaving of two loads' output.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use udiff_parser::{LineReader, ReadError};

use crate::document::DiffDocument;
use crate::outline::OutlineTree;
use crate::session::{DocumentError, ParseSession};

/// Terminal result of one background load.
pub enum LoadOutcome {
    /// The source was read to exhaustion and fully classified.
    Complete {
        document: DiffDocument,
        outline: OutlineTree,
    },
    /// Reading the source failed. The already-classified prefix is left
    /// intact in `document`.
    Failed {
        error: ReadError,
        document: DiffDocument,
        outline: OutlineTree,
    },
    /// The load was cancelled before completion.
    Cancelled,
}

impl std::fmt::Debug for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Complete { document, .. } => f
                .debug_struct("Complete")
                .field("bytes", &document.len())
                .finish(),
            LoadOutcome::Failed { error, .. } => {
                f.debug_struct("Failed").field("error", error).finish()
            }
            LoadOutcome::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Spawns and supervises background parse sessions.
///
/// Starting a new load cancels the previous one: the old session stops
/// reading its source, applies no further mutations and reports
/// [`LoadOutcome::Cancelled`]. The source handle is closed (dropped) on
/// every exit path.
#[derive(Default)]
pub struct DiffLoader {
    cancel: Option<Arc<AtomicBool>>,
    handle: Option<JoinHandle<()>>,
}

impl DiffLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a background load of `source`, delivering the outcome over
    /// `notify`. Any in-flight load is cancelled first.
    pub fn load<R>(&mut self, source: R, notify: Sender<LoadOutcome>)
    where
        R: Read + Send + 'static,
    {
        self.cancel();

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));
        self.handle = Some(thread::spawn(move || {
            let outcome = run_session(source, &cancel);
            // The receiver may be gone if the caller shut down meanwhile.
            if notify.send(outcome).is_err() {
                log::debug!("load outcome dropped: receiver disconnected");
            }
        }));
    }

    /// Requests cancellation of the in-flight load, if any.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
        self.handle = None;
    }
}

impl Drop for DiffLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_session<R: Read>(source: R, cancel: &AtomicBool) -> LoadOutcome {
    let mut session = ParseSession::new(DiffDocument::new(), OutlineTree::new());
    let mut reader = LineReader::new(source);

    loop {
        if cancel.load(Ordering::Relaxed) {
            log::info!("diff load cancelled");
            return LoadOutcome::Cancelled;
        }
        match reader.next_line() {
            Ok(Some(line)) => {
                // The worker thread created the session, so ownership
                // violations cannot occur here.
                if let Err(e) = session.append(&line) {
                    unreachable!("session mutated by its owner: {e}");
                }
            }
            Ok(None) => break,
            Err(error) => {
                log::error!("diff load failed: {error}");
                let (document, outline) = session.cancel();
                return LoadOutcome::Failed {
                    error,
                    document,
                    outline,
                };
            }
        }
    }

    match session.finish() {
        Ok((document, outline)) => {
            log::info!("diff load complete: {} bytes", document.len());
            LoadOutcome::Complete { document, outline }
        }
        Err(e @ DocumentError::OwnershipViolation { .. }) => {
            unreachable!("session finished by its owner: {e}")
        }
        Err(DocumentError::Read(error)) => {
            // finish() performs no reads; kept for exhaustiveness.
            LoadOutcome::Failed {
                error,
                document: DiffDocument::new(),
                outline: OutlineTree::new(),
            }
        }
    }
}
