//! Signature-gated reveal.
//!
//! Decoding an opaque score locally is gated on the user signing the
//! session challenge. The signature is collected as consent and is not
//! verified here.

use tracing::{debug, info};

use cipherscore_crypto::{OpaqueScore, ScoreCodec};

use crate::challenge::build_challenge;
use crate::error::Result;
use crate::session::SessionParams;
use crate::signer::{ChallengeSignature, ChallengeSigner};

/// A decoded score and the signature that authorized it.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealedScore {
    /// Plaintext score.
    pub value: f64,
    /// Signature over the session challenge.
    pub signature: ChallengeSignature,
}

/// Reveal `opaque` after `signer` signs the challenge for `session`.
///
/// # Errors
///
/// - `ProtocolError::InvalidSession` if `session` fails validation
/// - whatever `signer` returns, unchanged (no decode is attempted)
/// - `ProtocolError::Decode` if the opaque value is malformed
pub async fn reveal<C, S>(
    codec: &C,
    opaque: &OpaqueScore,
    session: &SessionParams,
    signer: &S,
) -> Result<RevealedScore>
where
    C: ScoreCodec + ?Sized,
    S: ChallengeSigner + ?Sized,
{
    session.validate()?;

    let challenge = build_challenge(session);
    debug!(
        chain_id = session.chain_id,
        duration_days = session.duration_days,
        "Requesting reveal signature"
    );

    let signature = signer.sign(&challenge).await?;
    let value = codec.decode(opaque)?;

    info!(contract = %session.contract_address, "Score revealed");
    Ok(RevealedScore { value, signature })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::ProtocolError;
    use crate::signer::{FnSigner, LocalKeySigner};
    use cipherscore_crypto::{CryptoError, TaggedCodec};

    /// Codec that counts decode calls.
    struct CountingCodec {
        decodes: Arc<AtomicUsize>,
    }

    impl ScoreCodec for CountingCodec {
        fn encode(&self, value: f64) -> OpaqueScore {
            TaggedCodec.encode(value)
        }

        fn decode(&self, opaque: &OpaqueScore) -> std::result::Result<f64, CryptoError> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            TaggedCodec.decode(opaque)
        }
    }

    fn session() -> SessionParams {
        SessionParams::new("0xC0", 11155111)
    }

    #[tokio::test]
    async fn test_reveal_after_signature() {
        let signer = LocalKeySigner::generate();
        let session = session();
        let revealed = reveal(&TaggedCodec, &OpaqueScore::new("FHE-Nzcw"), &session, &signer)
            .await
            .unwrap();

        assert_eq!(revealed.value, 770.0);
        assert!(signer.verify(&build_challenge(&session), &revealed.signature));
    }

    #[tokio::test]
    async fn test_rejected_signature_skips_decode() {
        let decodes = Arc::new(AtomicUsize::new(0));
        let codec = CountingCodec {
            decodes: decodes.clone(),
        };
        let signer = FnSigner::new(|_: &str| Err(ProtocolError::UserRejected));

        let result = reveal(&codec, &OpaqueScore::new("FHE-NzAw"), &session(), &signer).await;
        assert_eq!(result, Err(ProtocolError::UserRejected));
        assert_eq!(decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let signer = FnSigner::new(|_: &str| Err(ProtocolError::Transport("offline".into())));
        let result = reveal(&TaggedCodec, &OpaqueScore::new("FHE-NzAw"), &session(), &signer).await;
        assert_eq!(result, Err(ProtocolError::Transport("offline".into())));
    }

    #[tokio::test]
    async fn test_signer_sees_exact_challenge() {
        let session = session();
        let expected = build_challenge(&session);
        let signer = FnSigner::new(move |c: &str| {
            assert_eq!(c, expected);
            Ok(ChallengeSignature::new(vec![1]))
        });
        reveal(&TaggedCodec, &OpaqueScore::new("FHE-NzAw"), &session, &signer)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_decode_error_after_signing() {
        let signer = LocalKeySigner::generate();
        let result = reveal(&TaggedCodec, &OpaqueScore::new("FHE-YWJj"), &session(), &signer).await;
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[tokio::test]
    async fn test_invalid_session_is_not_signed() {
        let session = session().with_duration_days(0);
        let signer = FnSigner::new(|_: &str| -> crate::Result<ChallengeSignature> {
            panic!("signer must not be called")
        });
        let result = reveal(&TaggedCodec, &OpaqueScore::new("FHE-NzAw"), &session, &signer).await;
        assert!(matches!(result, Err(ProtocolError::InvalidSession(_))));
    }
}
