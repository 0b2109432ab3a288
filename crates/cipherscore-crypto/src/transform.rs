//! Named operations applied to opaque scores.
//!
//! From the caller's perspective the engine is opaque in, opaque out. With
//! the placeholder codec this means decode, compute, re-encode; the decoded
//! plaintext is held in a [`Zeroizing`] buffer and wiped before returning.
//!
//! Multipliers are applied as exact ratios (`v * 11 / 10` rather than
//! `v * 1.1`) so integer scores stay integers. Near the top of the `f64`
//! range the division runs first so the intermediate product cannot
//! overflow.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use zeroize::Zeroizing;

use crate::codec::{OpaqueScore, ScoreCodec};
use crate::error::{CryptoError, Result};

/// A numeric operation supported by the [`TransformEngine`].
///
/// Serializes under its canonical name. Deserializing goes through
/// [`Operation::from_name`], so aliases and the identity fallback apply to
/// configuration files too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Multiply by 1.10.
    #[default]
    #[serde(rename = "increase10pct")]
    Increase10Pct,
    /// Multiply by 0.90.
    #[serde(rename = "decrease10pct")]
    Decrease10Pct,
    /// Multiply by 2.
    Double,
    /// Leave the value unchanged.
    Identity,
}

impl Operation {
    /// Resolve an operation by name.
    ///
    /// Unrecognized names resolve to [`Operation::Identity`] instead of an
    /// error. This permissive fallback is kept for compatibility with
    /// existing callers and is logged at `warn`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "increase10pct" | "increase10%" => Operation::Increase10Pct,
            "decrease10pct" | "decrease10%" => Operation::Decrease10Pct,
            "double" => Operation::Double,
            "identity" => Operation::Identity,
            other => {
                warn!(operation = %other, "Unknown transform, falling back to identity");
                Operation::Identity
            }
        }
    }

    /// Canonical name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Increase10Pct => "increase10pct",
            Operation::Decrease10Pct => "decrease10pct",
            Operation::Double => "double",
            Operation::Identity => "identity",
        }
    }

    /// Ratio applied by this operation as `(numerator, denominator)`.
    pub fn ratio(&self) -> (f64, f64) {
        match self {
            Operation::Increase10Pct => (11.0, 10.0),
            Operation::Decrease10Pct => (9.0, 10.0),
            Operation::Double => (2.0, 1.0),
            Operation::Identity => (1.0, 1.0),
        }
    }

    fn compute(&self, value: f64) -> f64 {
        let (num, den) = self.ratio();
        if value.abs() > f64::MAX / num {
            value / den * num
        } else {
            value * num / den
        }
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Operation::from_name(&name))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Applies [`Operation`]s to opaque scores through a [`ScoreCodec`].
#[derive(Clone, Debug, Default)]
pub struct TransformEngine<C> {
    codec: C,
}

impl<C: ScoreCodec> TransformEngine<C> {
    /// Create an engine over the given codec.
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// The codec used by this engine.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Apply an operation, returning a new opaque value.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Decode`] for malformed input, or when the
    /// result leaves the finite range and could not be decoded again.
    pub fn apply(&self, opaque: &OpaqueScore, operation: Operation) -> Result<OpaqueScore> {
        let plain = Zeroizing::new(self.codec.decode(opaque)?);
        let result = Zeroizing::new(operation.compute(*plain));
        if !result.is_finite() {
            return Err(CryptoError::Decode(format!(
                "{} result is not finite",
                operation
            )));
        }
        Ok(self.codec.encode(*result))
    }

    /// Apply an operation looked up with [`Operation::from_name`].
    pub fn apply_named(&self, opaque: &OpaqueScore, name: &str) -> Result<OpaqueScore> {
        self.apply(opaque, Operation::from_name(name))
    }
}
