//! Configuration for the report lifecycle manager.
//!
//! # Example
//!
//! ```
//! use cipherscore_core::config::{ManagerConfig, ManagerConfigBuilder};
//! use cipherscore_crypto::Operation;
//!
//! // Use defaults
//! let config = ManagerConfig::default();
//! assert_eq!(config.approval_operation, Operation::Increase10Pct);
//!
//! // Or use builder for customization
//! let config = ManagerConfigBuilder::new()
//!     .with_approval_operation(Operation::Double)
//!     .with_index_retry_limit(3)
//!     .build();
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cipherscore_crypto::Operation;
use cipherscore_protocol::DEFAULT_DURATION_DAYS;
use cipherscore_store::DEFAULT_INDEX_RETRY_LIMIT;

/// Default number of attempts to generate an id not already indexed.
const DEFAULT_ID_GENERATION_ATTEMPTS: usize = 5;

/// Upper bound on the reveal window, in days.
const MAX_REVEAL_WINDOW_DAYS: u32 = 3650;

/// Lifecycle manager configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Transform applied to the opaque score on approval.
    pub approval_operation: Operation,

    /// Condition approve/reject writes on the bytes read, when the store
    /// supports it.
    ///
    /// With this off (or on a store without conditional writes) a racing
    /// approve/reject pair is last-writer-wins.
    pub optimistic_writes: bool,

    /// Compare-and-swap attempts for an index append.
    pub index_retry_limit: usize,

    /// Attempts to generate an id that does not collide with the index.
    pub id_generation_attempts: usize,

    /// Default reveal window for new sessions, in days.
    pub default_reveal_window_days: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            approval_operation: Operation::Increase10Pct,
            optimistic_writes: true,
            index_retry_limit: DEFAULT_INDEX_RETRY_LIMIT,
            id_generation_attempts: DEFAULT_ID_GENERATION_ATTEMPTS,
            default_reveal_window_days: DEFAULT_DURATION_DAYS,
        }
    }
}

impl ManagerConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::new()
    }

    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_retry_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "index_retry_limit".into(),
                reason: "retry limit must be greater than zero".into(),
            });
        }

        if self.id_generation_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "id_generation_attempts".into(),
                reason: "id generation attempts must be greater than zero".into(),
            });
        }

        if self.default_reveal_window_days == 0
            || self.default_reveal_window_days > MAX_REVEAL_WINDOW_DAYS
        {
            return Err(ConfigError::InvalidValue {
                field: "default_reveal_window_days".into(),
                reason: format!(
                    "reveal window must be between 1 and {} days",
                    MAX_REVEAL_WINDOW_DAYS
                ),
            });
        }

        Ok(())
    }
}

/// Builder for [`ManagerConfig`].
#[derive(Clone, Debug, Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the final configuration.
    pub fn build(self) -> ManagerConfig {
        self.config
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<ManagerConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }

    /// Set the approval transform.
    pub fn with_approval_operation(mut self, op: Operation) -> Self {
        self.config.approval_operation = op;
        self
    }

    /// Enable or disable conditional approve/reject writes.
    pub fn with_optimistic_writes(mut self, enabled: bool) -> Self {
        self.config.optimistic_writes = enabled;
        self
    }

    /// Set the index append retry limit.
    pub fn with_index_retry_limit(mut self, limit: usize) -> Self {
        self.config.index_retry_limit = limit;
        self
    }

    /// Set the id generation attempt limit.
    pub fn with_id_generation_attempts(mut self, attempts: usize) -> Self {
        self.config.id_generation_attempts = attempts;
        self
    }

    /// Set the default reveal window.
    pub fn with_default_reveal_window_days(mut self, days: u32) -> Self {
        self.config.default_reveal_window_days = days;
        self
    }
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The field name.
        field: String,
        /// The reason it's invalid.
        reason: String,
    },

    /// The configuration text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(String),
}
