//! Error types for reveal protocol operations.

use thiserror::Error;

/// Errors that can occur while authorizing and performing a reveal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The signing collaborator declined to sign the challenge.
    #[error("User rejected the signature request")]
    UserRejected,

    /// The signing collaborator failed for another reason.
    #[error("Signer transport error: {0}")]
    Transport(String),

    /// Session parameters are unusable.
    #[error("Invalid session parameters: {0}")]
    InvalidSession(String),

    /// Signer key material is malformed.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// Signature bytes have the wrong shape.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The opaque score could not be decoded after signing.
    #[error("Decode error: {0}")]
    Decode(#[from] cipherscore_crypto::CryptoError),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
