//! # cipherscore-crypto
//!
//! Opaque-value primitives for CipherScore.
//!
//! This crate provides:
//! - **Codec**: reversible encoding between a plain score and its opaque form
//! - **TransformEngine**: named numeric operations that stay opaque end-to-end
//!
//! ## Placeholder Scheme
//!
//! The default [`TaggedCodec`] is a reversible tagged encoding, not
//! encryption. It exists to fix the protocol shape (encode, compute on the
//! opaque value, decode on authorized reveal) so a homomorphic or threshold
//! scheme can be dropped in behind [`ScoreCodec`] without touching callers.
//!
//! ```
//! use cipherscore_crypto::{Operation, ScoreCodec, TaggedCodec, TransformEngine};
//!
//! let codec = TaggedCodec;
//! let opaque = codec.encode(100.0);
//!
//! let engine = TransformEngine::new(codec);
//! let raised = engine.apply(&opaque, Operation::Increase10Pct).unwrap();
//! assert_eq!(codec.decode(&raised).unwrap(), 110.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod transform;

#[cfg(test)]
mod proptests;

pub use codec::{OpaqueScore, ScoreCodec, TaggedCodec, OPAQUE_TAG};
pub use error::{CryptoError, Result};
pub use transform::{Operation, TransformEngine};
