//! # cipherscore-store
//!
//! Persistence for CipherScore reports on top of a flat key-value store.
//!
//! Provides:
//! - [`KvStore`]: the `read(key)` / `write(key, bytes)` collaborator contract
//! - [`MemoryKvStore`] and [`SledKvStore`] backends
//! - [`ReportStore`]: the record collection, including the index key that
//!   stands in for native listing
//!
//! ## Layout
//!
//! | Key | Value |
//! |---|---|
//! | `report_keys` | JSON array of report ids |
//! | `report_<id>` | JSON object `{score, timestamp, owner, sources, status}` |
//!
//! ```ignore
//! use cipherscore_store::{MemoryKvStore, ReportStore};
//!
//! let store = ReportStore::new(MemoryKvStore::new());
//! assert!(store.list_ids().await?.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod kv;
pub mod memory;
pub mod record;
pub mod report_store;
pub mod sled_backend;

pub use error::{Result, StoreError};
pub use kv::KvStore;
pub use memory::MemoryKvStore;
pub use record::{Report, ReportId, ReportStatus, StoredReport};
pub use report_store::{
    ReportStore, VersionedReport, DEFAULT_INDEX_RETRY_LIMIT, INDEX_KEY, RECORD_KEY_PREFIX,
};
pub use sled_backend::SledKvStore;
