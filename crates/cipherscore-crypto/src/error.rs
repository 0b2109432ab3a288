//! Error types for codec and transform operations.

use thiserror::Error;

/// Errors that can occur while decoding or transforming opaque values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The opaque payload could not be turned back into a number.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
