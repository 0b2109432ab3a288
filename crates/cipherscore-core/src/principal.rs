//! Caller identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An authenticated caller, usually a wallet address.
///
/// Comparison against report owners ignores ASCII case, since wallet
/// addresses differ only in checksum casing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Create a principal from an address, trimming surrounding whitespace.
    ///
    /// # Returns
    ///
    /// `None` if the address is blank.
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        let trimmed = address.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The address as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this principal is `owner`, ignoring ASCII case.
    pub fn matches(&self, owner: &str) -> bool {
        self.0.eq_ignore_ascii_case(owner)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
