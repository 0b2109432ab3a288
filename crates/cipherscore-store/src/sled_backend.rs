//! Sled-based persistent key-value backend.
//!
//! All CipherScore keys live in a single sled tree. Sled's native
//! compare-and-swap backs [`KvStore::compare_and_swap`], so the index and
//! approval races are closed when this backend is used.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::kv::KvStore;
use crate::{Result, StoreError};

/// Name of the sled tree holding all keys.
const KV_TREE_NAME: &str = "cipherscore_kv";

/// Persistent [`KvStore`] backed by sled.
pub struct SledKvStore {
    db: sled::Db,
    tree: sled::Tree,
    path: PathBuf,
}

impl std::fmt::Debug for SledKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledKvStore")
            .field("path", &self.path)
            .field("entry_count", &self.tree.len())
            .finish()
    }
}

impl SledKvStore {
    /// Open or create a store at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if sled cannot open the directory.
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| StoreError::Database(format!("Failed to open database: {}", e)))?;

        let tree = db
            .open_tree(KV_TREE_NAME)
            .map_err(|e| StoreError::Database(format!("Failed to open kv tree: {}", e)))?;

        debug!(path = %path.display(), "Opened sled kv store");

        Ok(Self {
            db,
            tree,
            path: path.to_path_buf(),
        })
    }

    /// Path of the database directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush pending writes to disk.
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to flush: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for SledKvStore {
    async fn is_available(&self) -> bool {
        // Sled has no remote side; an open handle is always usable.
        true
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .tree
            .get(key.as_bytes())
            .map_err(|e| StoreError::Database(format!("Failed to get: {}", e)))?;
        Ok(value.map(|v| v.to_vec()))
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.tree
            .insert(key.as_bytes(), value)
            .map_err(|e| StoreError::Database(format!("Failed to insert: {}", e)))?;
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
        let outcome = self
            .tree
            .compare_and_swap(key.as_bytes(), expected, Some(value))
            .map_err(|e| StoreError::Database(format!("Failed to compare-and-swap: {}", e)))?;
        Ok(outcome.is_ok())
    }
}
