//! # cipherscore-protocol
//!
//! Signature-gated reveal of opaque CipherScore values.
//!
//! This crate provides:
//! - **SessionParams**: public identifier, contract, chain and validity window
//! - **build_challenge**: the deterministic text a user signs
//! - **ChallengeSigner**: the signing collaborator (a wallet in production)
//! - **reveal**: sign first, decode only on success
//!
//! ## Consent, Not Access Control
//!
//! The returned signature is never verified by the reveal flow. Signing is a
//! consent gate before a local decode; anyone holding the opaque value and
//! the codec can decode it without one.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod challenge;
pub mod error;
pub mod reveal;
pub mod session;
pub mod signer;

#[cfg(test)]
mod proptests;

pub use challenge::build_challenge;
pub use error::{ProtocolError, Result};
pub use reveal::{reveal, RevealedScore};
pub use session::{generate_public_key, SessionParams, DEFAULT_DURATION_DAYS};
pub use signer::{ChallengeSignature, ChallengeSigner, FnSigner, LocalKeySigner};
