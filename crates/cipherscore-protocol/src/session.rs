//! Reveal session parameters.
//!
//! A session binds a reveal request to an opaque public identifier, the
//! contract and chain the scores belong to, and a validity window. The
//! values are echoed verbatim into the challenge the user signs.

use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Default validity window in days.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Number of random bytes behind a generated public identifier.
///
/// Hex encoding doubles this to 2000 characters.
pub const PUBLIC_KEY_BYTES: usize = 1000;

/// Parameters of one reveal session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Opaque public identifier, `0x`-prefixed hex.
    pub public_key: String,
    /// Address of the contract holding the scores.
    pub contract_address: String,
    /// Chain the contract lives on.
    pub chain_id: u64,
    /// Window start, seconds since epoch.
    pub start_timestamp: i64,
    /// Window length in days.
    pub duration_days: u32,
}

impl SessionParams {
    /// Start a session now with a fresh public identifier and the default
    /// window.
    pub fn new(contract_address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            public_key: generate_public_key(),
            contract_address: contract_address.into(),
            chain_id,
            start_timestamp: Utc::now().timestamp(),
            duration_days: DEFAULT_DURATION_DAYS,
        }
    }

    /// Override the window length.
    pub fn with_duration_days(mut self, days: u32) -> Self {
        self.duration_days = days;
        self
    }

    /// Override the window start.
    pub fn with_start_timestamp(mut self, start: i64) -> Self {
        self.start_timestamp = start;
        self
    }

    /// Check the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidSession` for an empty public key or
    /// contract address, or a zero-day window.
    pub fn validate(&self) -> Result<()> {
        if self.public_key.trim().is_empty() {
            return Err(ProtocolError::InvalidSession(
                "public key must not be empty".into(),
            ));
        }
        if self.contract_address.trim().is_empty() {
            return Err(ProtocolError::InvalidSession(
                "contract address must not be empty".into(),
            ));
        }
        if self.duration_days == 0 {
            return Err(ProtocolError::InvalidSession(
                "duration must be at least one day".into(),
            ));
        }
        Ok(())
    }

    /// Window end, seconds since epoch.
    pub fn expires_at(&self) -> i64 {
        self.start_timestamp
            .saturating_add(i64::from(self.duration_days) * 86_400)
    }
}

/// Generate an opaque `0x`-prefixed public identifier.
pub fn generate_public_key() -> String {
    let mut bytes = vec![0u8; PUBLIC_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
