//! Deterministic reveal challenge.
//!
//! The challenge is five `label:value` lines joined by `\n` with no trailing
//! newline. Label spelling and line order are part of the wire contract with
//! signing wallets and must not change.

use crate::session::SessionParams;

/// Label for the public identifier line.
pub const LABEL_PUBLIC_KEY: &str = "publickey";
/// Label for the contract address line.
pub const LABEL_CONTRACT: &str = "contractAddresses";
/// Label for the chain id line.
pub const LABEL_CHAIN_ID: &str = "contractsChainId";
/// Label for the window start line.
pub const LABEL_START: &str = "startTimestamp";
/// Label for the window length line.
pub const LABEL_DURATION: &str = "durationDays";

/// Build the challenge text for `session`.
///
/// ```
/// use cipherscore_protocol::{build_challenge, SessionParams};
///
/// let session = SessionParams {
///     public_key: "0xab".into(),
///     contract_address: "0xC0".into(),
///     chain_id: 1,
///     start_timestamp: 1700000000,
///     duration_days: 30,
/// };
/// assert_eq!(
///     build_challenge(&session),
///     "publickey:0xab\ncontractAddresses:0xC0\ncontractsChainId:1\nstartTimestamp:1700000000\ndurationDays:30"
/// );
/// ```
pub fn build_challenge(session: &SessionParams) -> String {
    [
        format!("{}:{}", LABEL_PUBLIC_KEY, session.public_key),
        format!("{}:{}", LABEL_CONTRACT, session.contract_address),
        format!("{}:{}", LABEL_CHAIN_ID, session.chain_id),
        format!("{}:{}", LABEL_START, session.start_timestamp),
        format!("{}:{}", LABEL_DURATION, session.duration_days),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionParams {
        SessionParams {
            public_key: "0xdeadbeef".into(),
            contract_address: "0x1234567890abcdef".into(),
            chain_id: 11155111,
            start_timestamp: 1700000000,
            duration_days: 30,
        }
    }

    #[test]
    fn test_challenge_exact_text() {
        let expected = "publickey:0xdeadbeef\n\
                        contractAddresses:0x1234567890abcdef\n\
                        contractsChainId:11155111\n\
                        startTimestamp:1700000000\n\
                        durationDays:30";
        assert_eq!(build_challenge(&session()), expected);
    }

    #[test]
    fn test_challenge_no_trailing_newline() {
        let challenge = build_challenge(&session());
        assert!(!challenge.ends_with('\n'));
        assert_eq!(challenge.lines().count(), 5);
    }

    #[test]
    fn test_challenge_is_deterministic() {
        assert_eq!(build_challenge(&session()), build_challenge(&session()));
    }

    #[test]
    fn test_challenge_tracks_every_field() {
        let base = build_challenge(&session());
        let changed = SessionParams {
            duration_days: 7,
            ..session()
        };
        assert_ne!(build_challenge(&changed), base);
        assert!(build_challenge(&changed).ends_with("durationDays:7"));
    }
}
