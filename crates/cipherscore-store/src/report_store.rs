//! Record collection on top of a flat [`KvStore`].
//!
//! The backing store has no listing primitive, so the collection keeps an
//! explicit index: a JSON array of ids under [`INDEX_KEY`]. Each record lives
//! under [`RECORD_KEY_PREFIX`]` + id`.
//!
//! ## Index Consistency
//!
//! Creating a record takes two writes (record, then index) and the store
//! offers no multi-key transaction. A failed index append leaves an orphaned
//! record that listing cannot reach; callers surface that as a warning.
//!
//! ## Concurrency
//!
//! [`ReportStore::append_to_index`] is a read-modify-write of one key.
//!
//! - With conditional writes ([`KvStore::supports_conditional_writes`]) the
//!   append is a compare-and-swap loop, retried up to the configured limit.
//! - Without them it is **not atomic**: two concurrent appends can race and
//!   the last writer wins, dropping the other id from the index. This is an
//!   accepted weakness of plain flat stores.

use tracing::{debug, warn};

use crate::kv::KvStore;
use crate::record::{Report, ReportId, StoredReport};
use crate::{Result, StoreError};

/// Key holding the JSON array of all report ids.
pub const INDEX_KEY: &str = "report_keys";

/// Prefix for per-report keys.
pub const RECORD_KEY_PREFIX: &str = "report_";

/// Default number of compare-and-swap attempts for an index append.
pub const DEFAULT_INDEX_RETRY_LIMIT: usize = 8;

/// A report together with the exact bytes it was read from.
///
/// The raw bytes are the expectation for a later conditional rewrite.
#[derive(Clone, Debug)]
pub struct VersionedReport {
    /// Decoded report.
    pub report: Report,
    /// Bytes as read from the store.
    pub raw: Vec<u8>,
}

/// Report collection backed by a [`KvStore`].
#[derive(Debug)]
pub struct ReportStore<S> {
    kv: S,
    index_retry_limit: usize,
}

impl<S: KvStore> ReportStore<S> {
    /// Create a collection over `kv`.
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            index_retry_limit: DEFAULT_INDEX_RETRY_LIMIT,
        }
    }

    /// Set the number of compare-and-swap attempts for index appends.
    pub fn with_index_retry_limit(mut self, limit: usize) -> Self {
        self.index_retry_limit = limit.max(1);
        self
    }

    /// The underlying key-value store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Storage key for a report id.
    pub fn record_key(id: &ReportId) -> String {
        format!("{}{}", RECORD_KEY_PREFIX, id)
    }

    /// Fail with [`StoreError::Unavailable`] if the availability check fails.
    pub async fn ensure_available(&self) -> Result<()> {
        if self.kv.is_available().await {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    // =======================================================================
    // Index
    // =======================================================================

    /// List all indexed ids in insertion order.
    ///
    /// A missing or empty index yields an empty list. A malformed index is
    /// logged and also yields an empty list.
    pub async fn list_ids(&self) -> Result<Vec<ReportId>> {
        let raw = self.kv.read(INDEX_KEY).await?;
        match parse_index(raw.as_deref()) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                warn!(error = %e, "Failed to parse report index, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Check whether `id` is present in the index.
    pub async fn contains_id(&self, id: &ReportId) -> Result<bool> {
        Ok(self.list_ids().await?.contains(id))
    }

    /// Append `id` to the index.
    ///
    /// Appending an id that is already indexed is a no-op. See the module
    /// docs for the concurrency caveat.
    ///
    /// # Errors
    ///
    /// - `StoreError::Corruption` if the current index cannot be parsed (the
    ///   index is left untouched rather than overwritten)
    /// - `StoreError::Conflict` if every compare-and-swap attempt lost
    pub async fn append_to_index(&self, id: &ReportId) -> Result<()> {
        let conditional = self.kv.supports_conditional_writes();

        for attempt in 1..=self.index_retry_limit {
            let current = self.kv.read(INDEX_KEY).await?;
            let mut ids = parse_index(current.as_deref())?;

            if ids.contains(id) {
                debug!(id = %id, "Report already indexed");
                return Ok(());
            }
            ids.push(id.clone());

            let bytes =
                serde_json::to_vec(&ids).map_err(|e| StoreError::Serialization(e.to_string()))?;

            if !conditional {
                self.kv.write(INDEX_KEY, &bytes).await?;
                debug!(id = %id, count = ids.len(), "Appended to index");
                return Ok(());
            }

            if self
                .kv
                .compare_and_swap(INDEX_KEY, current.as_deref(), &bytes)
                .await?
            {
                debug!(id = %id, count = ids.len(), attempt, "Appended to index");
                return Ok(());
            }

            debug!(id = %id, attempt, "Index changed concurrently, retrying append");
        }

        Err(StoreError::Conflict(format!(
            "index append for {} lost {} times",
            id, self.index_retry_limit
        )))
    }

    // =======================================================================
    // Records
    // =======================================================================

    /// Load a single report.
    ///
    /// # Returns
    ///
    /// `None` if no record exists for `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corruption` if the stored bytes do not decode.
    pub async fn load_record(&self, id: &ReportId) -> Result<Option<Report>> {
        Ok(self.load_versioned(id).await?.map(|v| v.report))
    }

    /// Load a report along with its raw stored bytes.
    pub async fn load_versioned(&self, id: &ReportId) -> Result<Option<VersionedReport>> {
        let raw = match self.kv.read(&Self::record_key(id)).await? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        let stored = StoredReport::from_bytes(&raw)?;
        Ok(Some(VersionedReport {
            report: Report::from_stored(id.clone(), stored),
            raw,
        }))
    }

    /// Load every indexed report, newest first.
    ///
    /// Missing and undecodable records are skipped with a warning; one bad
    /// record never fails the whole listing.
    pub async fn load_all(&self) -> Result<Vec<Report>> {
        let ids = self.list_ids().await?;
        let mut reports = Vec::with_capacity(ids.len());

        for id in &ids {
            match self.load_record(id).await {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => warn!(id = %id, "Indexed report has no record, skipping"),
                Err(e) => warn!(id = %id, error = %e, "Failed to load report, skipping"),
            }
        }

        // Stable sort keeps index order for equal timestamps.
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(indexed = ids.len(), loaded = reports.len(), "Loaded reports");
        Ok(reports)
    }

    /// Write a report record.
    ///
    /// Does not touch the index; new ids must also go through
    /// [`ReportStore::append_to_index`].
    pub async fn save_record(&self, report: &Report) -> Result<()> {
        let bytes = report.to_stored().to_bytes()?;
        self.kv.write(&Self::record_key(&report.id), &bytes).await?;
        debug!(id = %report.id, status = %report.status, "Saved report");
        Ok(())
    }

    /// Rewrite a report only if its stored bytes still equal `expected`.
    ///
    /// Falls back to a plain write when the store has no conditional writes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` when another writer got there first.
    pub async fn replace_record(&self, report: &Report, expected: &[u8]) -> Result<()> {
        if !self.kv.supports_conditional_writes() {
            return self.save_record(report).await;
        }

        let bytes = report.to_stored().to_bytes()?;
        let swapped = self
            .kv
            .compare_and_swap(&Self::record_key(&report.id), Some(expected), &bytes)
            .await?;

        if !swapped {
            return Err(StoreError::Conflict(format!(
                "report {} changed since it was read",
                report.id
            )));
        }

        debug!(id = %report.id, status = %report.status, "Replaced report");
        Ok(())
    }
}

fn parse_index(raw: Option<&[u8]>) -> Result<Vec<ReportId>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(Vec::new()),
    };

    let text = std::str::from_utf8(raw)
        .map_err(|_| StoreError::Corruption("report index is not UTF-8".into()))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(text)
        .map_err(|e| StoreError::Corruption(format!("invalid report index: {}", e)))
}
