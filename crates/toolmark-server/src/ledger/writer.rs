// crates/toolmark-server/src/ledger/writer.rs
// Flush worker: the single consumer of a ledger's write queue
//
// Each ledger owns exactly one worker, so writes to its file are strictly
// FIFO and never overlap. Write requests that pile up while a write is in
// flight are coalesced into one write of the newest state, and a write is
// skipped entirely when nothing changed since the last successful one.

use crate::persist::{self, LedgerDocument};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

pub(crate) enum FlushRequest {
    /// Persist the current in-memory document
    Write,
    /// Resolve once every request queued before it has been written
    Barrier(oneshot::Sender<()>),
}

pub(crate) struct FlushWorker<D: LedgerDocument> {
    pub(crate) path: PathBuf,
    pub(crate) state: Arc<Mutex<Option<D>>>,
    /// Set by every mutation, cleared when a write starts, restored if it fails
    pub(crate) dirty: Arc<AtomicBool>,
    pub(crate) max_bytes: Option<u64>,
    pub(crate) rx: mpsc::UnboundedReceiver<FlushRequest>,
}

impl<D: LedgerDocument> FlushWorker<D> {
    /// Run until every sender is dropped
    pub(crate) async fn run(mut self) {
        tracing::debug!(kind = D::KIND, path = %self.path.display(), "Flush worker started");

        while let Some(request) = self.rx.recv().await {
            let mut barriers = Vec::new();
            let mut write = false;
            match request {
                FlushRequest::Write => write = true,
                FlushRequest::Barrier(ack) => barriers.push(ack),
            }

            // Everything already queued is covered by a write taken now
            while let Ok(next) = self.rx.try_recv() {
                match next {
                    FlushRequest::Write => write = true,
                    FlushRequest::Barrier(ack) => barriers.push(ack),
                }
            }

            if write {
                self.flush_once().await;
            }
            for ack in barriers {
                let _ = ack.send(());
            }
        }

        tracing::debug!(kind = D::KIND, "Flush worker stopped");
    }

    async fn flush_once(&self) {
        // Copy under the lock; trimming and serializing happen without it
        let mut document = {
            let guard = self.lock_state();
            let Some(document) = guard.as_ref() else {
                return;
            };
            if !self.dirty.swap(false, Ordering::AcqRel) {
                tracing::trace!(kind = D::KIND, "Ledger unchanged, skipping write");
                return;
            }
            document.clone()
        };

        let before = document.record_count();
        let json = match document.serialize_for_write(self.max_bytes) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(kind = D::KIND, error = %e, "Failed to serialize ledger");
                self.dirty.store(true, Ordering::Release);
                return;
            }
        };

        let trimmed = before.saturating_sub(document.record_count());
        if trimmed > 0 {
            let mut guard = self.lock_state();
            if let Some(live) = guard.as_mut() {
                live.discard_oldest(trimmed);
            }
        }

        match persist::write_contents(&self.path, json.as_bytes()).await {
            Ok(()) => {
                tracing::debug!(kind = D::KIND, bytes = json.len(), "Ledger flushed");
            }
            Err(e) => {
                // In-memory state stays authoritative; the next flush retries.
                self.dirty.store(true, Ordering::Release);
                tracing::error!(
                    kind = D::KIND,
                    path = %self.path.display(),
                    error = %e,
                    "Failed to write ledger"
                );
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<D>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
