//! Key-value collaborator abstraction.
//!
//! The [`KvStore`] trait is the only contract CipherScore needs from the
//! underlying store: flat reads and writes of byte blobs under string keys,
//! plus an availability check. There is no listing and no transaction.
//!
//! Backends that can condition a write on the value previously read may
//! also implement [`KvStore::compare_and_swap`]. The record layer uses it to
//! close the index and approval races; without it those races are accepted.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Result, StoreError};

/// Trait for flat key-value backends.
///
/// ## Semantics
///
/// - `read` returns `None` for keys that were never written. Callers treat an
///   empty value the same as a missing one.
/// - `write` replaces the whole value.
/// - Implementations must never panic on arbitrary keys or values.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Check whether the store can currently serve requests.
    async fn is_available(&self) -> bool;

    /// Read the value stored under `key`.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`.
    async fn write(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Whether [`KvStore::compare_and_swap`] is implemented.
    fn supports_conditional_writes(&self) -> bool {
        false
    }

    /// Write `value` only if the current value equals `expected`.
    ///
    /// `expected = None` means the key must not exist. Returns `Ok(false)`
    /// when the current value differs.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`StoreError::Unsupported`].
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool> {
        let _ = (expected, value);
        Err(StoreError::Unsupported(format!(
            "conditional write to {}",
            key
        )))
    }
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).write(key, value).await
    }

    fn supports_conditional_writes(&self) -> bool {
        (**self).supports_conditional_writes()
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool> {
        (**self).compare_and_swap(key, expected, value).await
    }
}
