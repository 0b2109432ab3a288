//! Credit report records and their persisted JSON shape.

use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use cipherscore_crypto::OpaqueScore;

use crate::{Result, StoreError};

/// Alphabet for the random part of a report id.
const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random part of a report id.
const ID_SUFFIX_LEN: usize = 7;

/// Unique identifier for a report.
///
/// Generated as `<unix millis>-<7 base36 chars>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Generate a new id from the current time and a random suffix.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}-{}", Utc::now().timestamp_millis(), suffix))
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportId({})", self.0)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Approval status of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved; the score has been transformed.
    Approved,
    /// Rejected; the score is untouched.
    Rejected,
}

impl ReportStatus {
    /// Check if this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Check if `next` is a valid successor of this status.
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }

    /// Lowercase name as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted JSON object stored under `report_<id>`.
///
/// Fields other than the five known ones are kept in `extra` and written
/// back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Opaque score.
    pub score: OpaqueScore,
    /// Creation time, seconds since epoch.
    pub timestamp: i64,
    /// Creating principal.
    pub owner: String,
    /// Data provenance labels. Missing or null in some legacy records.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
    /// Approval status. Missing or null in some legacy records.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ReportStatus,
    /// Unknown fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StoredReport {
    /// Parse a record from its stored bytes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corruption` for invalid UTF-8 or JSON.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| StoreError::Corruption(format!("invalid report record: {}", e)))
    }

    /// Serialize to UTF-8 JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// A credit report.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Unique id (also the storage key suffix).
    pub id: ReportId,
    /// Opaque score; only codec and transform code interpret it.
    pub opaque_score: OpaqueScore,
    /// Creation time, seconds since epoch.
    pub created_at: i64,
    /// Creating principal.
    pub owner: String,
    /// Data provenance labels.
    pub sources: Vec<String>,
    /// Approval status.
    pub status: ReportStatus,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Report {
    /// Create a new pending report stamped with the current time.
    pub fn new(
        id: ReportId,
        opaque_score: OpaqueScore,
        owner: impl Into<String>,
        sources: Vec<String>,
    ) -> Self {
        Self {
            id,
            opaque_score,
            created_at: Utc::now().timestamp(),
            owner: owner.into(),
            sources,
            status: ReportStatus::Pending,
            extra: serde_json::Map::new(),
        }
    }

    /// Rebuild a report from its id and persisted form.
    pub fn from_stored(id: ReportId, stored: StoredReport) -> Self {
        Self {
            id,
            opaque_score: stored.score,
            created_at: stored.timestamp,
            owner: stored.owner,
            sources: stored.sources,
            status: stored.status,
            extra: stored.extra,
        }
    }

    /// Convert to the persisted form.
    pub fn to_stored(&self) -> StoredReport {
        StoredReport {
            score: self.opaque_score.clone(),
            timestamp: self.created_at,
            owner: self.owner.clone(),
            sources: self.sources.clone(),
            status: self.status,
            extra: self.extra.clone(),
        }
    }

    /// Check ownership, ignoring ASCII case.
    pub fn is_owned_by(&self, principal: &str) -> bool {
        self.owner.eq_ignore_ascii_case(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_id_format() {
        let id = ReportId::generate();
        let (millis, suffix) = id.as_str().split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_report_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..200).map(|_| ReportId::generate()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_status_transitions() {
        use ReportStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        assert!(Approved.is_terminal() && Rejected.is_terminal() && !Pending.is_terminal());
    }

    #[test]
    fn test_stored_shape() {
        let report = Report::new(
            ReportId::new("1-abc"),
            OpaqueScore::new("FHE-NzAw"),
            "0xA",
            vec!["Bank A".into()],
        );
        let value: serde_json::Value =
            serde_json::from_slice(&report.to_stored().to_bytes().unwrap()).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 5);
        assert_eq!(obj["score"], "FHE-NzAw");
        assert_eq!(obj["owner"], "0xA");
        assert_eq!(obj["sources"], serde_json::json!(["Bank A"]));
        assert_eq!(obj["status"], "pending");
        assert!(obj["timestamp"].is_i64());
    }

    #[test]
    fn test_legacy_record_defaults() {
        let stored =
            StoredReport::from_bytes(br#"{"score":"FHE-NzAw","timestamp":5,"owner":"0xA"}"#)
                .unwrap();
        assert!(stored.sources.is_empty());
        assert_eq!(stored.status, ReportStatus::Pending);
    }

    #[test]
    fn test_legacy_record_null_fields() {
        let stored = StoredReport::from_bytes(
            br#"{"score":"FHE-NzAw","timestamp":5,"owner":"0xA","sources":null,"status":null}"#,
        )
        .unwrap();
        assert!(stored.sources.is_empty());
        assert_eq!(stored.status, ReportStatus::Pending);
        assert!(stored.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive() {
        let raw = br#"{"score":"x","timestamp":1,"owner":"o","sources":[],"status":"approved","note":"keep"}"#;
        let report = Report::from_stored(ReportId::new("r"), StoredReport::from_bytes(raw).unwrap());
        let bytes = report.to_stored().to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["note"], "keep");
        assert_eq!(value["status"], "approved");
    }

    #[test]
    fn test_invalid_bytes_are_corruption() {
        assert!(matches!(
            StoredReport::from_bytes(b"{not json"),
            Err(StoreError::Corruption(_))
        ));
    }

    #[test]
    fn test_owner_check_ignores_case() {
        let report = Report::new(
            ReportId::new("r"),
            OpaqueScore::new("1"),
            "0xAbCd",
            vec!["s".into()],
        );
        assert!(report.is_owned_by("0xabcd"));
        assert!(!report.is_owned_by("0xabce"));
    }
}
