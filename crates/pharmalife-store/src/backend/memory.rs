//! In-memory backend for tests and throwaway sessions.
//!
//! Can be told to fail reads and/or writes, which is how the tests exercise
//! degraded init and the legacy fallback path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::StorageBackend;
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

/// A `HashMap` backend. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every read and write fails.
    pub fn unavailable() -> Self {
        let backend = Self::new();
        backend.set_fail_reads(true);
        backend.set_fail_writes(true);
        backend
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stores a value directly, bypassing failure simulation.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries().insert(key.into(), value.into());
    }

    /// Reads a value directly, bypassing failure simulation.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    /// Number of successful saves since creation.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, key: &str) -> StorageResult<Option<String>> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated read failure".into()));
        }
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated write failure".into()));
        }
        self.insert(key, value);
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated write failure".into()));
        }
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.load("main").await.unwrap(), None);

        backend.save("main", "{}").await.unwrap();
        assert_eq!(backend.load("main").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(backend.save_count(), 1);

        backend.remove("main").await.unwrap();
        backend.remove("main").await.unwrap();
        assert_eq!(backend.load("main").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let backend = MemoryBackend::unavailable();
        assert!(backend.load("main").await.is_err());
        assert!(backend.save("main", "{}").await.is_err());
        assert!(!backend.contains("main"));

        backend.set_fail_writes(false);
        assert!(backend.save("main", "{}").await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let a = MemoryBackend::new();
        let b = a.clone();
        a.save("k", "v").await.unwrap();
        assert_eq!(b.get("k").as_deref(), Some("v"));
    }
}
