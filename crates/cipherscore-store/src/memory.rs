//! In-memory key-value backend.
//!
//! Stores values in a thread-safe `HashMap`. Nothing persists across
//! restarts. Supports conditional writes, and the availability check can be
//! toggled to exercise outage handling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::kv::KvStore;
use crate::{Result, StoreError};

/// In-memory [`KvStore`] for tests and ephemeral sessions.
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    available: AtomicBool,
}

impl std::fmt::Debug for MemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("MemoryKvStore")
            .field("entry_count", &count)
            .field("available", &self.available.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Flip the result of the availability check.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Database("memory store lock poisoned".into())
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn supports_conditional_writes(&self) -> bool {
        true
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if entries.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_key() {
        let store = MemoryKvStore::new();
        assert_eq!(store.read("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let store = MemoryKvStore::new();
        store.write("k", b"v1").await.unwrap();
        store.write("k", b"v2").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let store = MemoryKvStore::new();

        // Absent key: only `None` matches.
        assert!(!store.compare_and_swap("k", Some(&b"x"[..]), b"a").await.unwrap());
        assert!(store.compare_and_swap("k", None, b"a").await.unwrap());

        // Stale expectation loses.
        assert!(!store.compare_and_swap("k", None, b"b").await.unwrap());
        assert!(store.compare_and_swap("k", Some(&b"a"[..]), b"b").await.unwrap());
        assert_eq!(store.read("k").await.unwrap(), Some(b"b".to_vec()));
    }

    #[tokio::test]
    async fn test_availability_toggle() {
        let store = MemoryKvStore::new();
        assert!(store.is_available().await);
        store.set_available(false);
        assert!(!store.is_available().await);
    }
}
