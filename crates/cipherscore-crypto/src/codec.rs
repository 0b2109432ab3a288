//! Reversible encoding between plain scores and opaque values.
//!
//! ## Wire Format
//!
//! ```text
//! "FHE-" || base64(shortest decimal representation of the value)
//! ```
//!
//! The tag lets [`ScoreCodec::decode`] tell encoded values apart from plain
//! numbers written by older clients.
//!
//! ## Compatibility Shim
//!
//! Untagged input is parsed directly as a number. This tolerates legacy
//! records and is **not** a security property: anything that reads the raw
//! store can read an untagged score.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};

/// Tag prefixed to every value produced by [`TaggedCodec`].
pub const OPAQUE_TAG: &str = "FHE-";

/// An opaque score as persisted in the store.
///
/// Only codec and transform code should look inside.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueScore(String);

impl OpaqueScore {
    /// Wrap a raw value read from storage.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw string form.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the value carries the [`OPAQUE_TAG`].
    pub fn is_tagged(&self) -> bool {
        self.0.starts_with(OPAQUE_TAG)
    }
}

impl fmt::Debug for OpaqueScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep logs short; payloads are not useful in traces.
        let preview: String = self.0.chars().take(12).collect();
        write!(f, "OpaqueScore({}...)", preview)
    }
}

impl fmt::Display for OpaqueScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode/decode pair for opaque scores.
///
/// Implementations must be pure and must round-trip every finite value:
/// `decode(encode(v)) == v`.
pub trait ScoreCodec: Send + Sync {
    /// Encode a plain value.
    fn encode(&self, value: f64) -> OpaqueScore;

    /// Decode an opaque value.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Decode`] if the payload is malformed or does not
    /// describe a finite number.
    fn decode(&self, opaque: &OpaqueScore) -> Result<f64>;
}

/// Default placeholder codec (tagged base64 of the decimal value).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaggedCodec;

impl ScoreCodec for TaggedCodec {
    fn encode(&self, value: f64) -> OpaqueScore {
        // `Display` for f64 prints the shortest string that parses back to
        // the same bits.
        let decimal = value.to_string();
        OpaqueScore(format!("{}{}", OPAQUE_TAG, STANDARD.encode(decimal.as_bytes())))
    }

    fn decode(&self, opaque: &OpaqueScore) -> Result<f64> {
        match opaque.as_str().strip_prefix(OPAQUE_TAG) {
            Some(payload) => {
                let bytes = STANDARD
                    .decode(payload)
                    .map_err(|e| CryptoError::Decode(format!("invalid base64 payload: {}", e)))?;
                let decimal = std::str::from_utf8(&bytes)
                    .map_err(|_| CryptoError::Decode("payload is not UTF-8".into()))?;
                parse_finite(decimal)
            }
            None => parse_finite(opaque.as_str()),
        }
    }
}

fn parse_finite(s: &str) -> Result<f64> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| CryptoError::Decode(format!("not a number: {:?}", truncate(s))))?;

    if !value.is_finite() {
        return Err(CryptoError::Decode("value is not finite".into()));
    }
    Ok(value)
}

fn truncate(s: &str) -> String {
    s.chars().take(32).collect()
}
