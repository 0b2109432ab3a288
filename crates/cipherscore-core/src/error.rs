//! Error types for report lifecycle operations.

use thiserror::Error;

use cipherscore_crypto::CryptoError;
use cipherscore_protocol::ProtocolError;
use cipherscore_store::{ReportId, ReportStatus, StoreError};

use crate::config::ConfigError;

/// Errors that can occur during report lifecycle operations.
///
/// Collaborator errors that callers act on (unavailable store, lost race,
/// declined signature, undecodable score) are lifted into their own
/// variants; the rest stay wrapped.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No caller identity was supplied.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The caller does not own the report.
    #[error("Caller does not own report {0}")]
    Forbidden(ReportId),

    /// No record exists for the id.
    #[error("Report not found: {0}")]
    NotFound(ReportId),

    /// The report is not in a state that allows the requested change.
    #[error("Invalid transition for report {id}: {from} -> {to}")]
    InvalidTransition {
        /// Report id.
        id: ReportId,
        /// Current status.
        from: ReportStatus,
        /// Requested status.
        to: ReportStatus,
    },

    /// Submitted report data is unusable.
    #[error("Invalid report: {0}")]
    InvalidReport(String),

    /// An opaque score could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The user declined to sign the reveal challenge.
    #[error("User rejected the signature request")]
    UserRejected,

    /// The store failed its availability check.
    #[error("Store unavailable")]
    StoreUnavailable,

    /// A concurrent writer changed the record or index first.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Store(StoreError),

    /// Protocol error.
    #[error("Protocol error: {0}")]
    Protocol(ProtocolError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => Self::StoreUnavailable,
            StoreError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Store(other),
        }
    }
}

impl From<ProtocolError> for CoreError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UserRejected => Self::UserRejected,
            ProtocolError::Decode(e) => e.into(),
            other => Self::Protocol(other),
        }
    }
}

impl From<CryptoError> for CoreError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Decode(msg) => Self::Decode(msg),
        }
    }
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, CoreError>;
