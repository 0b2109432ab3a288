//! Fuzz target for TaggedCodec::decode.
//!
//! Decoding arbitrary opaque strings must never panic, and anything that
//! decodes must re-encode to a value that decodes identically.

#![no_main]

use cipherscore_crypto::{OpaqueScore, ScoreCodec, TaggedCodec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let codec = TaggedCodec;
    if let Ok(value) = codec.decode(&OpaqueScore::new(data)) {
        assert!(value.is_finite());
        let again = codec.decode(&codec.encode(value)).unwrap();
        assert_eq!(again.to_bits(), value.to_bits());
    }
});
