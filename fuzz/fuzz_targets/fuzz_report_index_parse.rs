//! Fuzz target for report index handling.
//!
//! A store holding arbitrary bytes under the index key must list without
//! panicking.

#![no_main]

use cipherscore_store::{KvStore, MemoryKvStore, ReportStore, INDEX_KEY};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let store = ReportStore::new(MemoryKvStore::new());

    runtime.block_on(async {
        store.kv().write(INDEX_KEY, data).await.unwrap();
        let ids = store.list_ids().await.unwrap();
        assert!(store.load_all().await.unwrap().len() <= ids.len());
    });
});
