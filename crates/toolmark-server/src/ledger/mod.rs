// crates/toolmark-server/src/ledger/mod.rs
// Append-only JSON ledgers: in-memory authoritative state plus a background write queue
//
// A `Ledger<D>` owns one document. Mutations happen synchronously under a
// mutex and then enqueue a flush; the flush worker (see `writer`) is the only
// code that touches the file after initialization.

pub mod aggregate;
pub mod invocations;
pub mod issues;
mod writer;

pub use invocations::{InvocationCollector, InvocationEvent};
pub use issues::{IssueCollector, MAX_ISSUES};

use crate::persist::{self, LedgerDocument, LoadOutcome};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use writer::{FlushRequest, FlushWorker};

/// Generic ledger over a persisted document
pub struct Ledger<D: LedgerDocument> {
    path: PathBuf,
    server_name: String,
    max_bytes: Option<u64>,
    state: Arc<Mutex<Option<D>>>,
    dirty: Arc<AtomicBool>,
    queue: Mutex<Option<mpsc::UnboundedSender<FlushRequest>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<D: LedgerDocument> Ledger<D> {
    pub fn new(path: impl Into<PathBuf>, server_name: impl Into<String>, max_bytes: Option<u64>) -> Self {
        Self {
            path: path.into(),
            server_name: server_name.into(),
            max_bytes,
            state: Arc::new(Mutex::new(None)),
            dirty: Arc::new(AtomicBool::new(false)),
            queue: Mutex::new(None),
            worker: tokio::sync::Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn is_initialized(&self) -> bool {
        self.lock_state().is_some()
    }

    /// Load the backing document and start the flush worker.
    ///
    /// A missing or corrupted file is replaced with an empty document that is
    /// written back immediately. Calling this twice is a no-op.
    pub async fn initialize(&self) -> LoadOutcome {
        if self.is_initialized() {
            tracing::debug!(kind = D::KIND, "Ledger already initialized");
            return LoadOutcome::Existing;
        }

        let loaded = persist::load::<D>(&self.path, &self.server_name).await;
        if loaded.outcome.needs_persist()
            && let Err(e) = persist::save(&self.path, &loaded.document).await
        {
            tracing::error!(
                kind = D::KIND,
                path = %self.path.display(),
                error = %e,
                "Failed to write fresh ledger"
            );
        }

        {
            let mut state = self.lock_state();
            if state.is_some() {
                return LoadOutcome::Existing;
            }
            *state = Some(loaded.document);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let worker = FlushWorker {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
            dirty: Arc::clone(&self.dirty),
            max_bytes: self.max_bytes,
            rx,
        };
        *self.lock_queue() = Some(tx);
        *self.worker.lock().await = Some(tokio::spawn(worker.run()));

        tracing::info!(
            kind = D::KIND,
            path = %self.path.display(),
            outcome = ?loaded.outcome,
            "Ledger initialized"
        );
        loaded.outcome
    }

    /// Load the backing document for reading only.
    ///
    /// Nothing is written: a missing or corrupted file stays as it is and no
    /// flush worker is started, so later mutations live in memory only.
    pub async fn open_read_only(&self) -> LoadOutcome {
        if self.is_initialized() {
            return LoadOutcome::Existing;
        }
        let loaded = persist::load::<D>(&self.path, &self.server_name).await;
        let mut state = self.lock_state();
        if state.is_none() {
            *state = Some(loaded.document);
        }
        tracing::debug!(kind = D::KIND, path = %self.path.display(), outcome = ?loaded.outcome, "Ledger opened read-only");
        loaded.outcome
    }

    /// Apply `f` to the in-memory document and enqueue a flush.
    ///
    /// Returns `None` without touching anything when not initialized.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut D) -> R) -> Option<R> {
        let result = {
            let mut state = self.lock_state();
            let document = state.as_mut()?;
            let result = f(document);
            self.dirty.store(true, Ordering::Release);
            result
        };
        self.enqueue(FlushRequest::Write);
        Some(result)
    }

    /// Read from the in-memory document without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&D) -> R) -> Option<R> {
        self.lock_state().as_ref().map(f)
    }

    /// Clone of the current in-memory document
    pub fn snapshot(&self) -> Option<D> {
        self.read(D::clone)
    }

    /// Request a write and wait until it has completed
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if !self.enqueue(FlushRequest::Write) || !self.enqueue(FlushRequest::Barrier(ack_tx)) {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Drain the write queue and stop the worker.
    ///
    /// Later mutations still update memory but are no longer persisted.
    pub async fn shutdown(&self) {
        self.flush().await;
        drop(self.lock_queue().take());
        if let Some(handle) = self.worker.lock().await.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(kind = D::KIND, error = %e, "Flush worker ended abnormally");
        }
    }

    fn enqueue(&self, request: FlushRequest) -> bool {
        match self.lock_queue().as_ref() {
            Some(tx) => tx.send(request).is_ok(),
            None => {
                tracing::debug!(kind = D::KIND, "Write queue closed, skipping flush");
                false
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<D>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, Option<mpsc::UnboundedSender<FlushRequest>>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolmark_types::IssueDocument;

    fn ledger_in(dir: &tempfile::TempDir) -> Ledger<IssueDocument> {
        Ledger::new(dir.path().join("srv.issues.json"), "srv", None)
    }

    #[tokio::test]
    async fn test_initialize_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        assert!(!ledger.is_initialized());

        let outcome = ledger.initialize().await;
        assert_eq!(outcome, LoadOutcome::Missing);
        assert!(ledger.is_initialized());
        assert!(ledger.path().exists());
    }

    #[tokio::test]
    async fn test_mutate_before_initialize_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        assert!(ledger.mutate(|doc| doc.total_issues += 1).is_none());
        assert!(ledger.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_second_initialize_keeps_state() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.initialize().await;
        ledger.mutate(|doc| doc.total_issues = 7);
        ledger.initialize().await;
        assert_eq!(ledger.read(|doc| doc.total_issues), Some(7));
    }

    #[tokio::test]
    async fn test_flush_persists_latest_state() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.initialize().await;
        for _ in 0..25 {
            ledger.mutate(|doc| doc.total_issues += 1);
        }
        ledger.flush().await;

        let on_disk: IssueDocument =
            serde_json::from_str(&std::fs::read_to_string(ledger.path()).unwrap()).unwrap();
        assert_eq!(on_disk.total_issues, 25);
    }

    #[tokio::test]
    async fn test_shutdown_then_mutate_stays_in_memory() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.initialize().await;
        ledger.mutate(|doc| doc.total_issues = 1);
        ledger.shutdown().await;

        ledger.mutate(|doc| doc.total_issues = 2);
        ledger.flush().await;
        assert_eq!(ledger.read(|doc| doc.total_issues), Some(2));

        let on_disk: IssueDocument =
            serde_json::from_str(&std::fs::read_to_string(ledger.path()).unwrap()).unwrap();
        assert_eq!(on_disk.total_issues, 1);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        // Parent is a regular file, so every write fails
        let ledger: Ledger<IssueDocument> = Ledger::new(blocker.join("srv.issues.json"), "srv", None);
        ledger.initialize().await;
        ledger.mutate(|doc| doc.total_issues = 3);
        ledger.flush().await;
        assert_eq!(ledger.read(|doc| doc.total_issues), Some(3));
    }

    fn total_on_disk(ledger: &Ledger<IssueDocument>) -> u64 {
        let doc: IssueDocument =
            serde_json::from_str(&std::fs::read_to_string(ledger.path()).unwrap()).unwrap();
        doc.total_issues
    }

    #[tokio::test]
    async fn test_failed_write_retried_once_path_clears() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "file").unwrap();
        let ledger: Ledger<IssueDocument> = Ledger::new(blocker.join("srv.issues.json"), "srv", None);
        ledger.initialize().await;
        ledger.mutate(|doc| doc.total_issues = 1);
        ledger.flush().await;
        assert!(!ledger.path().exists());

        // Unblock: the parent directory is created on the next write
        std::fs::remove_file(&blocker).unwrap();

        // The failed state is still pending, so a bare flush writes it
        ledger.flush().await;
        assert_eq!(total_on_disk(&ledger), 1);

        ledger.mutate(|doc| doc.total_issues += 1);
        ledger.flush().await;
        assert_eq!(total_on_disk(&ledger), 2);
    }

    #[tokio::test]
    async fn test_unchanged_ledger_is_not_rewritten() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        // Compact JSON, which a rewrite would pretty-print
        let compact = serde_json::to_string(&IssueDocument::empty("srv")).unwrap();
        std::fs::write(ledger.path(), &compact).unwrap();

        assert_eq!(ledger.initialize().await, LoadOutcome::Existing);
        ledger.flush().await;
        ledger.shutdown().await;
        assert_eq!(std::fs::read_to_string(ledger.path()).unwrap(), compact);
    }

    #[tokio::test]
    async fn test_read_only_open_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        assert_eq!(ledger.open_read_only().await, LoadOutcome::Missing);
        assert!(ledger.is_initialized());
        assert!(ledger.mutate(|doc| doc.total_issues = 5).is_some());
        ledger.flush().await;
        ledger.shutdown().await;
        assert!(!ledger.path().exists());

        std::fs::write(ledger.path(), "{ broken").unwrap();
        let again = ledger_in(&dir);
        assert_eq!(again.open_read_only().await, LoadOutcome::Recovered);
        assert_eq!(std::fs::read_to_string(again.path()).unwrap(), "{ broken");
    }
}
