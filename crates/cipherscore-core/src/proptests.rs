//! Property-based tests for the report manager.
//!
//! - Indexing: every submit is listed exactly once, in submission order
//! - Approval: the transform runs once and terminal reports stay put

use proptest::prelude::*;

use cipherscore_store::MemoryKvStore;

use crate::{CoreError, ManagerConfig, Principal, ReportManager, ReportStatus, ScoreCodec};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn manager() -> ReportManager<MemoryKvStore> {
    ReportManager::new(MemoryKvStore::new(), ManagerConfig::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Submitted ids appear once each, in order, and listing is newest first.
    #[test]
    fn submits_are_indexed_once(count in 1usize..8) {
        let owner = Principal::new("0xA11CE").unwrap();
        let manager = manager();

        let (submitted, indexed, listed) = runtime().block_on(async {
            let mut submitted = Vec::new();
            for i in 0..count {
                let report = manager
                    .submit(Some(&owner), vec![format!("Bank {}", i)], 600.0)
                    .await
                    .unwrap();
                submitted.push(report.id);
            }
            let indexed = manager.store().list_ids().await.unwrap();
            let listed = manager.list_reports().await.unwrap();
            (submitted, indexed, listed)
        });

        prop_assert_eq!(&indexed, &submitted);
        let mut unique = indexed.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), count);

        prop_assert_eq!(listed.len(), count);
        for pair in listed.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    /// Approval applies the transform once; a second approval is refused.
    #[test]
    fn approval_transforms_once(score in 0u32..100_000) {
        let owner = Principal::new("0xA11CE").unwrap();
        let manager = manager();

        let (approved, second, stored) = runtime().block_on(async {
            let report = manager
                .submit(Some(&owner), vec!["Bank A".into()], f64::from(score))
                .await
                .unwrap();
            let approved = manager.approve(&report.id, Some(&owner)).await.unwrap();
            let second = manager.approve(&report.id, Some(&owner)).await;
            let stored = manager.get_report(&report.id).await.unwrap();
            (approved, second, stored)
        });

        prop_assert_eq!(approved.status, ReportStatus::Approved);
        let is_invalid_transition = matches!(second, Err(CoreError::InvalidTransition { .. }));
        prop_assert!(is_invalid_transition);

        let expected = f64::from(score) * 11.0 / 10.0;
        let decoded = manager.codec().decode(&stored.opaque_score).unwrap();
        prop_assert!((decoded - expected).abs() < 0.001);
        prop_assert_eq!(stored.opaque_score, approved.opaque_score);
    }
}
