//! Property-based tests for promptkit-purchases
//!
//! These tests use proptest to verify invariants across a wide range of inputs.

mod classifier_properties {
    use promptkit_purchases::{classify, locale, BillingFault, Locale, RetryStrategy};
    use proptest::prelude::*;

    fn arb_fault() -> impl Strategy<Value = BillingFault> {
        (
            proptest::option::of(".{0,60}"),
            proptest::option::of("[A-Za-z0-9_]{0,20}"),
            proptest::option::of(100u16..600),
            any::<bool>(),
        )
            .prop_map(|(message, code, status, aborted)| BillingFault {
                message,
                code,
                status,
                aborted,
            })
    }

    proptest! {
        /// Classification is total and deterministic over arbitrary faults.
        #[test]
        fn classify_is_total_and_deterministic(fault in arb_fault()) {
            let first = classify(&fault);
            let second = classify(&fault);
            prop_assert_eq!(first, second);
        }

        /// Every classified kind carries at least two guidance steps and a
        /// non-empty headline in every locale.
        #[test]
        fn every_outcome_has_guidance(fault in arb_fault()) {
            let kind = classify(&fault);
            prop_assert!(locale::guidance(kind).len() >= 2);
            for loc in [Locale::En, Locale::De, Locale::Es, Locale::Fr] {
                prop_assert!(!loc.user_message(kind).is_empty());
            }
        }

        /// The retry strategy agrees with the kind's retryability flag.
        #[test]
        fn retry_strategy_matches_retryability(fault in arb_fault()) {
            let kind = classify(&fault);
            let strategy = RetryStrategy::for_kind(kind);
            prop_assert_eq!(strategy.should_retry, kind.is_retryable());
            if !strategy.should_retry {
                prop_assert_eq!(strategy.max_attempts, 0);
            }
        }

        /// Unknown locale tags never panic and fall back to English.
        #[test]
        fn locale_parsing_is_total(tag in ".{0,20}") {
            let _ = Locale::from_tag(&tag);
        }
    }

    #[test]
    fn cancellation_wording_beats_network_wording() {
        let fault = BillingFault::from_message("Network purchase cancelled by user");
        assert_eq!(
            classify(&fault),
            promptkit_purchases::PurchaseErrorKind::UserCancelled
        );
    }
}

mod validator_properties {
    use std::sync::Arc;

    use promptkit_lib::{MemoryKeyValueStorage, Platform, ProductId};
    use promptkit_purchases::{PurchaseReceipt, ReceiptValidator, ValidationConfig};
    use proptest::prelude::*;

    fn arb_receipt() -> impl Strategy<Value = PurchaseReceipt> {
        (
            "[a-z0-9]{0,12}",
            prop_oneof![
                Just("pro_plan_monthly".to_string()),
                Just("pro_plan_yearly".to_string()),
                "[a-z_]{1,16}",
            ],
            // Timestamps from far past through near future, including the
            // degenerate non-positive values the structural check rejects.
            -1_000i64..=2_000_000_000_000i64,
            prop_oneof![
                Just(Platform::AppStore),
                Just(Platform::GooglePlay),
                Just(Platform::Web)
            ],
            ".{0,20}",
        )
            .prop_map(|(token, product, time, platform, payload)| {
                PurchaseReceipt::new(
                    token,
                    ProductId::new(product),
                    time,
                    platform,
                    payload,
                    "sig",
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The security score stays within [0, 100] and validation never
        /// errors, whatever the receipt looks like.
        #[test]
        fn score_stays_in_bounds(receipt in arb_receipt()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let result = rt.block_on(async {
                let validator = ReceiptValidator::with_defaults(
                    Arc::new(MemoryKeyValueStorage::new()),
                    ValidationConfig::default(),
                );
                validator.validate_receipt(&receipt).await
            });
            prop_assert!(result.security_score <= 100);
            // A hard error implies the zero score, and validity implies the
            // configured minimum.
            if result.error.is_some() {
                prop_assert_eq!(result.security_score, 0);
            }
            if result.valid {
                prop_assert!(result.security_score >= ValidationConfig::default().min_security_score);
            }
        }

        /// Validating the same receipt twice never grows the ledger twice.
        #[test]
        fn revalidation_never_double_records(receipt in arb_receipt()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let validator = ReceiptValidator::with_defaults(
                    Arc::new(MemoryKeyValueStorage::new()),
                    ValidationConfig::default(),
                );
                validator.validate_receipt(&receipt).await;
                let after_first = validator.ledger().len().await;
                validator.validate_receipt(&receipt).await;
                let after_second = validator.ledger().len().await;
                assert!(after_first <= 1);
                assert_eq!(after_first, after_second);
            });
        }
    }
}

mod history_properties {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use promptkit_lib::MemoryKeyValueStorage;
    use promptkit_purchases::{ErrorHistory, PurchaseError, PurchaseErrorKind};
    use proptest::prelude::*;

    fn sample(n: usize) -> PurchaseError {
        let kind = PurchaseErrorKind::UnknownError;
        PurchaseError {
            error_id: format!("err-{}", n),
            kind,
            code: kind.code(),
            message: format!("failure {}", n),
            user_message: "Something went wrong. Please try again.".to_string(),
            details: BTreeMap::new(),
            timestamp_millis: n as i64,
            retryable: true,
            user_action: None,
            support_action: None,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// The history never holds more than its capacity and always keeps
        /// the most recent entries.
        #[test]
        fn history_stays_bounded(appends in 0usize..120) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let history = ErrorHistory::new(Arc::new(MemoryKeyValueStorage::new()));
                for n in 0..appends {
                    history.append(&sample(n)).await;
                }
                let all = history.all().await;
                assert!(all.len() <= ErrorHistory::DEFAULT_CAPACITY);
                assert_eq!(all.len(), appends.min(ErrorHistory::DEFAULT_CAPACITY));
                if let Some(last) = all.last() {
                    assert_eq!(last.error_id, format!("err-{}", appends - 1));
                }
            });
        }
    }
}
