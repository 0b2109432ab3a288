//! # cipherscore-core
//!
//! Report lifecycle for CipherScore.
//!
//! This is the main entry point for applications: a [`ReportManager`] over
//! any [`cipherscore_store::KvStore`] creates reports, approves or rejects
//! them, and gates reveals on a signed challenge.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cipherscore_core::{ManagerConfig, Principal, ReportManager};
//! use cipherscore_store::MemoryKvStore;
//!
//! let manager = ReportManager::new(MemoryKvStore::new(), ManagerConfig::default())?;
//! let owner = Principal::new("0xA11CE").unwrap();
//!
//! let report = manager.submit(Some(&owner), vec!["Bank A".into()], 700.0).await?;
//! let approved = manager.approve(&report.id, Some(&owner)).await?;
//! ```
//!
//! ## Report States
//!
//! - **Pending**: created, awaiting a decision
//! - **Approved**: terminal; the score was transformed once
//! - **Rejected**: terminal; the score is unchanged

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod manager;
pub mod principal;
pub mod query;
pub mod stats;

#[cfg(test)]
mod proptests;

pub use config::{ConfigError, ManagerConfig, ManagerConfigBuilder};
pub use error::{CoreError, Result};
pub use manager::ReportManager;
pub use principal::Principal;
pub use stats::{ReportStats, ScoreRange};

// Re-export the types callers need for the manager API.
pub use cipherscore_crypto::{OpaqueScore, Operation, ScoreCodec, TaggedCodec};
pub use cipherscore_protocol::{ChallengeSigner, RevealedScore, SessionParams};
pub use cipherscore_store::{KvStore, Report, ReportId, ReportStatus};
