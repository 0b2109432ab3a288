//! Error types for storage operations.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The availability check failed.
    #[error("Store unavailable")]
    Unavailable,

    /// Backend read or write failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored bytes could not be decoded.
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// A conditional write lost against a concurrent writer.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// The backend does not offer the requested primitive.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
