//! Property-based tests for the codec and transform engine.
//!
//! - Roundtrip: every finite value survives encode/decode
//! - Determinism: the same value always encodes the same way
//! - Transform laws: operations match their ratios, identity is a no-op

use proptest::prelude::*;

use crate::{Operation, OpaqueScore, ScoreCodec, TaggedCodec, TransformEngine};

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

proptest! {
    /// Decoding an encoded value returns the original bits.
    #[test]
    fn encode_decode_roundtrip(v in finite_f64()) {
        let decoded = TaggedCodec.decode(&TaggedCodec.encode(v)).unwrap();
        prop_assert_eq!(decoded.to_bits(), v.to_bits());
    }

    /// Encoding is a pure function.
    #[test]
    fn encoding_is_deterministic(v in finite_f64()) {
        prop_assert_eq!(TaggedCodec.encode(v), TaggedCodec.encode(v));
    }

    /// Decoding arbitrary strings never panics.
    #[test]
    fn decode_arbitrary_never_panics(s in ".*") {
        let _ = TaggedCodec.decode(&OpaqueScore::new(s));
    }

    /// Integer scores in a realistic range are transformed exactly.
    #[test]
    fn integer_scores_transform_exactly(score in 0u32..100_000) {
        let engine = TransformEngine::new(TaggedCodec);
        let opaque = TaggedCodec.encode(f64::from(score));

        let doubled = TaggedCodec.decode(&engine.apply(&opaque, Operation::Double).unwrap()).unwrap();
        prop_assert_eq!(doubled, f64::from(score) * 2.0);

        let raised = TaggedCodec
            .decode(&engine.apply(&opaque, Operation::Increase10Pct).unwrap())
            .unwrap();
        prop_assert_eq!(raised, f64::from(score) * 11.0 / 10.0);
    }

    /// Identity leaves every finite value unchanged.
    #[test]
    fn identity_is_noop(v in -1.0e12f64..1.0e12) {
        let engine = TransformEngine::new(TaggedCodec);
        let out = engine.apply(&TaggedCodec.encode(v), Operation::Identity).unwrap();
        prop_assert_eq!(TaggedCodec.decode(&out).unwrap(), v);
    }
}
