//! # Storage Backends
//!
//! A backend is a string-keyed store of serialized snapshots. The store
//! only ever writes whole snapshots, so the interface is four calls.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StorageBackend                                    │
//! │                                                                         │
//! │   load(key)  ──► Option<String>                                        │
//! │   save(key, value)                                                     │
//! │   remove(key)                                                          │
//! │                                                                         │
//! │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐            │
//! │   │ SqliteBackend │   │  FileBackend  │   │ MemoryBackend │            │
//! │   │   (primary)   │   │   (legacy)    │   │    (tests)    │            │
//! │   └───────────────┘   └───────────────┘   └───────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::StorageResult;

mod file;
mod memory;
mod sqlite;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sqlite::{SqliteBackend, SqliteConfig};

/// Durable key/value storage for repository snapshots.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name used in logs ("sqlite", "file", "memory").
    fn name(&self) -> &'static str;

    /// Reads the value under `key`. `Ok(None)` when nothing is stored.
    async fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}
