//! # Persistence Writer
//!
//! A single background task that applies snapshot writes in the order the
//! mutations happened.
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Persistence Writer Flow                              │
//! │                                                                         │
//! │  mutation (lock held)                                                  │
//! │     │ serialize Repository → snapshot                                  │
//! │     ▼                                                                   │
//! │  ┌─────────────── unbounded mpsc, FIFO ──────────────────┐             │
//! │  │  Save(S1) │ Save(S2) │ RemoveLegacy │ Flush(ack) │ …  │             │
//! │  └──────────────────────────┬─────────────────────────────┘             │
//! │                             ▼                                           │
//! │  PersistenceWriter::run                                                 │
//! │     1. primary.save("main", S)                                         │
//! │     2. on failure → legacy.save("pharmalife_db", S)                    │
//! │     3. on failure → log, count, move on                                │
//! │                                                                         │
//! │  Every message is a whole snapshot, so after the queue drains the      │
//! │  durable copy equals the last in-memory state.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store starts the writer only after the primary snapshot has been
//! read, so nothing queued before init can overwrite it unseen.
//!
//! Writes have no timeout. A hung backend delays durability but never
//! blocks a mutation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::backend::StorageBackend;

// =============================================================================
// Messages
// =============================================================================

/// Where a snapshot ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Primary,
    /// Primary failed; the legacy backend holds the snapshot.
    Fallback,
    /// Both backends failed. The snapshot exists only in memory.
    Failed,
}

pub(crate) enum WriteCommand {
    Save {
        snapshot: String,
        ack: Option<oneshot::Sender<WriteOutcome>>,
    },
    RemoveLegacy,
    Flush(oneshot::Sender<()>),
}

// =============================================================================
// Statistics
// =============================================================================

/// Counters of completed writes, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistStats {
    pub primary_writes: u64,
    pub fallback_writes: u64,
    pub failed_writes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    primary: AtomicU64,
    fallback: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: WriteOutcome) {
        let counter = match outcome {
            WriteOutcome::Primary => &self.primary,
            WriteOutcome::Fallback => &self.fallback,
            WriteOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PersistStats {
        PersistStats {
            primary_writes: self.primary.load(Ordering::Relaxed),
            fallback_writes: self.fallback.load(Ordering::Relaxed),
            failed_writes: self.failed.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Sending side of the writer queue. Cheap to clone.
#[derive(Clone)]
pub(crate) struct WriterHandle {
    tx: mpsc::UnboundedSender<WriteCommand>,
    counters: Arc<Counters>,
}

impl WriterHandle {
    /// Queues a snapshot write.
    pub fn save(&self, snapshot: String) {
        self.send(WriteCommand::Save {
            snapshot,
            ack: None,
        });
    }

    /// Queues a snapshot write and returns a receiver for its outcome.
    pub fn save_with_ack(&self, snapshot: String) -> oneshot::Receiver<WriteOutcome> {
        let (ack, rx) = oneshot::channel();
        self.send(WriteCommand::Save {
            snapshot,
            ack: Some(ack),
        });
        rx
    }

    /// Queues removal of the legacy snapshot.
    pub fn remove_legacy(&self) {
        self.send(WriteCommand::RemoveLegacy);
    }

    /// Waits until every command queued before this call has been applied.
    pub async fn flush(&self) {
        let (ack, rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(ack)).is_ok() {
            let _ = rx.await;
        }
    }

    pub fn stats(&self) -> PersistStats {
        self.counters.snapshot()
    }

    fn send(&self, command: WriteCommand) {
        if self.tx.send(command).is_err() {
            error!("Persistence writer has stopped; change kept in memory only");
        }
    }
}

// =============================================================================
// Writer Task
// =============================================================================

pub(crate) struct PersistenceWriter {
    primary: Arc<dyn StorageBackend>,
    legacy: Arc<dyn StorageBackend>,
    primary_key: String,
    legacy_key: String,
    rx: mpsc::UnboundedReceiver<WriteCommand>,
    counters: Arc<Counters>,
}

impl PersistenceWriter {
    /// Creates a stopped writer. Commands sent through the handle queue up
    /// until `start` is called.
    pub fn new(
        primary: Arc<dyn StorageBackend>,
        legacy: Arc<dyn StorageBackend>,
        primary_key: String,
        legacy_key: String,
    ) -> (WriterHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());

        let writer = PersistenceWriter {
            primary,
            legacy,
            primary_key,
            legacy_key,
            rx,
            counters: counters.clone(),
        };

        (WriterHandle { tx, counters }, writer)
    }

    /// Runs the writer on the current tokio runtime.
    pub fn start(self) {
        tokio::spawn(self.run());
    }

    /// Creates and immediately starts a writer.
    #[cfg(test)]
    pub fn spawn(
        primary: Arc<dyn StorageBackend>,
        legacy: Arc<dyn StorageBackend>,
        primary_key: String,
        legacy_key: String,
    ) -> WriterHandle {
        let (handle, writer) = Self::new(primary, legacy, primary_key, legacy_key);
        writer.start();
        handle
    }

    /// Applies commands until every handle is dropped.
    async fn run(mut self) {
        debug!(
            primary = self.primary.name(),
            legacy = self.legacy.name(),
            "Persistence writer started"
        );

        while let Some(command) = self.rx.recv().await {
            match command {
                WriteCommand::Save { snapshot, ack } => {
                    let outcome = self.write(&snapshot).await;
                    self.counters.record(outcome);
                    if let Some(ack) = ack {
                        let _ = ack.send(outcome);
                    }
                }
                WriteCommand::RemoveLegacy => self.remove_legacy().await,
                WriteCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }

        info!("Persistence writer stopped");
    }

    async fn write(&self, snapshot: &str) -> WriteOutcome {
        match self.primary.save(&self.primary_key, snapshot).await {
            Ok(()) => {
                debug!(
                    backend = self.primary.name(),
                    key = %self.primary_key,
                    bytes = snapshot.len(),
                    "Snapshot saved"
                );
                return WriteOutcome::Primary;
            }
            Err(e) => {
                error!(
                    backend = self.primary.name(),
                    key = %self.primary_key,
                    error = %e,
                    "Primary write failed, falling back to legacy backend"
                );
            }
        }

        match self.legacy.save(&self.legacy_key, snapshot).await {
            Ok(()) => {
                warn!(
                    backend = self.legacy.name(),
                    key = %self.legacy_key,
                    bytes = snapshot.len(),
                    "Snapshot saved to legacy backend"
                );
                WriteOutcome::Fallback
            }
            Err(e) => {
                error!(
                    backend = self.legacy.name(),
                    key = %self.legacy_key,
                    error = %e,
                    "Legacy write failed too; snapshot kept in memory only"
                );
                WriteOutcome::Failed
            }
        }
    }

    async fn remove_legacy(&self) {
        match self.legacy.remove(&self.legacy_key).await {
            Ok(()) => debug!(key = %self.legacy_key, "Legacy snapshot removed"),
            Err(e) => warn!(key = %self.legacy_key, error = %e, "Failed to remove legacy snapshot"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
