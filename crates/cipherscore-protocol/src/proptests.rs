//! Property-based tests for the reveal protocol.
//!
//! - The challenge has five labelled lines and echoes every field
//! - Local signatures verify only for the challenge they were made over

use proptest::prelude::*;

use crate::challenge::build_challenge;
use crate::session::SessionParams;
use crate::signer::LocalKeySigner;

fn arb_session() -> impl Strategy<Value = SessionParams> {
    (
        "0x[0-9a-f]{1,64}",
        "0x[0-9a-fA-F]{40}",
        any::<u64>(),
        any::<i64>(),
        1u32..3650,
    )
        .prop_map(
            |(public_key, contract_address, chain_id, start_timestamp, duration_days)| {
                SessionParams {
                    public_key,
                    contract_address,
                    chain_id,
                    start_timestamp,
                    duration_days,
                }
            },
        )
}

proptest! {
    #[test]
    fn challenge_has_five_labelled_lines(session in arb_session()) {
        let challenge = build_challenge(&session);
        let lines: Vec<&str> = challenge.split('\n').collect();

        prop_assert_eq!(lines.len(), 5);
        prop_assert_eq!(lines[0], format!("publickey:{}", session.public_key));
        prop_assert_eq!(lines[1], format!("contractAddresses:{}", session.contract_address));
        prop_assert_eq!(lines[2], format!("contractsChainId:{}", session.chain_id));
        prop_assert_eq!(lines[3], format!("startTimestamp:{}", session.start_timestamp));
        prop_assert_eq!(lines[4], format!("durationDays:{}", session.duration_days));
    }

    #[test]
    fn generated_sessions_validate(session in arb_session()) {
        prop_assert!(session.validate().is_ok());
    }

    #[test]
    fn local_signature_binds_challenge(a in ".{0,200}", b in ".{0,200}") {
        let signer = LocalKeySigner::from_bytes(&[7u8; 32]).unwrap();
        let sig = signer.sign_challenge(&a);
        prop_assert!(signer.verify(&a, &sig));
        if a != b {
            prop_assert!(!signer.verify(&b, &sig));
        }
    }
}
