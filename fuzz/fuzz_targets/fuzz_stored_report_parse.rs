//! Fuzz target for StoredReport::from_bytes.
//!
//! Parsing arbitrary record bytes must fail cleanly, and parsed records
//! must survive a write-back unchanged.

#![no_main]

use cipherscore_store::StoredReport;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(stored) = StoredReport::from_bytes(data) {
        let bytes = stored.to_bytes().unwrap();
        let roundtrip = StoredReport::from_bytes(&bytes).unwrap();
        assert_eq!(stored.owner, roundtrip.owner);
        assert_eq!(stored.status, roundtrip.status);
        assert_eq!(stored.sources, roundtrip.sources);
    }
});
