//! Signing collaborators for reveal challenges.
//!
//! A [`ChallengeSigner`] stands in for the user's wallet: it is shown the
//! challenge text and either returns a signature or declines. Declining is
//! reported as [`ProtocolError::UserRejected`] and is never retried.
//!
//! ## Placeholder Implementation Warning
//!
//! **[`LocalKeySigner`] IS A PLACEHOLDER**
//!
//! It signs with keyed BLAKE3 over a local secret, so anyone holding the key
//! file can produce "signatures", and verification needs the same secret.
//! It exists so the command line can exercise the consent gate without a
//! wallet. It is not a wallet signature scheme.

use std::fmt;

use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{ProtocolError, Result};

/// Domain separator mixed into every local signature.
pub const DOMAIN_SEPARATOR: &[u8] = b"CIPHERSCORE-REVEAL-CHALLENGE-v1";

/// Size of a local signing key in bytes.
pub const SIGNING_KEY_SIZE: usize = 32;

/// Signature returned by a signing collaborator.
///
/// The bytes are opaque to the reveal flow; only their presence matters.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChallengeSignature(Vec<u8>);

impl ChallengeSignature {
    /// Wrap raw signature bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a `0x`-prefixed or bare hex signature.
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        hex::decode(digits)
            .map(Self)
            .map_err(|_| ProtocolError::InvalidSignature)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for ChallengeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.0[..self.0.len().min(8)];
        write!(f, "ChallengeSignature({}...)", hex::encode(shown))
    }
}

impl PartialEq for ChallengeSignature {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for ChallengeSignature {}

/// Collaborator that signs reveal challenges on behalf of the user.
#[async_trait]
pub trait ChallengeSigner: Send + Sync {
    /// Sign `challenge`.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UserRejected` if the user declined
    /// - `ProtocolError::Transport` for any other failure
    async fn sign(&self, challenge: &str) -> Result<ChallengeSignature>;
}

/// Adapts a closure into a [`ChallengeSigner`].
pub struct FnSigner<F> {
    f: F,
}

impl<F> FnSigner<F>
where
    F: Fn(&str) -> Result<ChallengeSignature> + Send + Sync,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnSigner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSigner")
    }
}

#[async_trait]
impl<F> ChallengeSigner for FnSigner<F>
where
    F: Fn(&str) -> Result<ChallengeSignature> + Send + Sync,
{
    async fn sign(&self, challenge: &str) -> Result<ChallengeSignature> {
        (self.f)(challenge)
    }
}

/// Placeholder signer keyed by a local secret. See the module docs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LocalKeySigner {
    key: [u8; SIGNING_KEY_SIZE],
}

impl LocalKeySigner {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut key = [0u8; SIGNING_KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Create a signer from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidKey` unless `bytes` is exactly
    /// [`SIGNING_KEY_SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; SIGNING_KEY_SIZE] = bytes.try_into().map_err(|_| {
            ProtocolError::InvalidKey(format!(
                "expected {} bytes, got {}",
                SIGNING_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    /// Create a signer from a hex-encoded key.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(text.trim())
                .map_err(|e| ProtocolError::InvalidKey(format!("invalid hex: {}", e)))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Hex encoding of the key, for persisting to a key file.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.key))
    }

    /// Sign `challenge` synchronously.
    pub fn sign_challenge(&self, challenge: &str) -> ChallengeSignature {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(DOMAIN_SEPARATOR);
        hasher.update(challenge.as_bytes());
        ChallengeSignature(hasher.finalize().as_bytes().to_vec())
    }

    /// Check `signature` against `challenge` in constant time.
    pub fn verify(&self, challenge: &str, signature: &ChallengeSignature) -> bool {
        self.sign_challenge(challenge) == *signature
    }
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LocalKeySigner([REDACTED])")
    }
}

#[async_trait]
impl ChallengeSigner for LocalKeySigner {
    async fn sign(&self, challenge: &str) -> Result<ChallengeSignature> {
        Ok(self.sign_challenge(challenge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_sign_verify() {
        let signer = LocalKeySigner::generate();
        let sig = signer.sign_challenge("publickey:0x1");
        assert_eq!(sig.as_bytes().len(), 32);
        assert!(signer.verify("publickey:0x1", &sig));
        assert!(!signer.verify("publickey:0x2", &sig));
    }

    #[test]
    fn test_other_key_does_not_verify() {
        let a = LocalKeySigner::generate();
        let b = LocalKeySigner::generate();
        let sig = a.sign_challenge("c");
        assert!(!b.verify("c", &sig));
    }

    #[test]
    fn test_key_hex_roundtrip() {
        let signer = LocalKeySigner::generate();
        let restored = LocalKeySigner::from_hex(&signer.to_hex()).unwrap();
        assert_eq!(signer.sign_challenge("x"), restored.sign_challenge("x"));
    }

    #[test]
    fn test_key_wrong_length() {
        assert!(matches!(
            LocalKeySigner::from_bytes(&[1u8; 16]),
            Err(ProtocolError::InvalidKey(_))
        ));
        assert!(LocalKeySigner::from_hex("zz").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let signer = LocalKeySigner::from_bytes(&[0xAB; 32]).unwrap();
        assert!(!format!("{:?}", signer).contains("ab"));
    }

    #[test]
    fn test_signature_hex() {
        let sig = ChallengeSignature::new(vec![0xde, 0xad]);
        assert_eq!(sig.to_hex(), "0xdead");
        assert_eq!(ChallengeSignature::from_hex("0xdead").unwrap(), sig);
        assert_eq!(ChallengeSignature::from_hex("dead").unwrap(), sig);
        assert!(ChallengeSignature::from_hex("0xnothex").is_err());
    }

    #[tokio::test]
    async fn test_fn_signer() {
        let approve = FnSigner::new(|c: &str| Ok(ChallengeSignature::new(c.as_bytes().to_vec())));
        assert_eq!(approve.sign("hi").await.unwrap().as_bytes(), b"hi");

        let decline = FnSigner::new(|_: &str| Err(ProtocolError::UserRejected));
        assert_eq!(decline.sign("hi").await, Err(ProtocolError::UserRejected));
    }
}
