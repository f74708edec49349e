//! Entitlement lifecycle tests: purchase to access, expiry, and the free
//! monthly quota.

use std::sync::Arc;

use promptkit_lib::{
    DifficultyTier, FileKeyValueStorage, KeyValueStorage, MemoryKeyValueStorage, Platform,
    ProductId,
};
use promptkit_purchases::{
    AccessConfig, AccessController, PurchaseReceipt, ReceiptValidator, SubscriptionStatus,
    UsageCounter, ValidationConfig, SUBSCRIPTION_RECORD_KEY, UNLIMITED_USES, USAGE_COUNTER_KEY,
};

fn fresh_receipt(token: &str) -> PurchaseReceipt {
    PurchaseReceipt::new(
        token,
        ProductId::pro_monthly(),
        chrono::Utc::now().timestamp_millis(),
        Platform::GooglePlay,
        "payload",
        "sig",
    )
}

#[tokio::test]
async fn test_validated_purchase_unlocks_access() {
    let storage = Arc::new(MemoryKeyValueStorage::new());
    let validator =
        ReceiptValidator::with_defaults(storage.clone(), ValidationConfig::default());
    let access = AccessController::new(storage, AccessConfig::default());

    assert!(!access.has_entitlement().await);

    let receipt = fresh_receipt("tok_flow");
    let result = validator.validate_receipt(&receipt).await;
    assert!(result.valid);
    access.store_from_receipt(&receipt).await.unwrap();

    assert!(access.has_entitlement().await);
    assert!(access.can_access_tier(DifficultyTier::Expert).await);
    assert_eq!(access.remaining_free_uses().await, UNLIMITED_USES);
}

#[tokio::test]
async fn test_expired_subscription_reverts_to_free_tier() {
    let storage = Arc::new(MemoryKeyValueStorage::new());
    let access = AccessController::new(storage, AccessConfig::default());

    // A purchase whose 30-day window has already passed.
    let now = chrono::Utc::now().timestamp_millis();
    let mut receipt = fresh_receipt("tok_old");
    receipt.purchase_time_millis = now - 31 * 24 * 60 * 60 * 1_000;
    access.store_from_receipt(&receipt).await.unwrap();

    let record = access.load_subscription().await.unwrap();
    assert_eq!(record.status, SubscriptionStatus::Active);

    assert!(!access.has_entitlement().await);
    assert!(!access.can_access_tier(DifficultyTier::Intermediate).await);
    assert!(access.can_access_tier(DifficultyTier::Beginner).await);
    assert_eq!(access.remaining_free_uses().await, 3);
}

#[tokio::test]
async fn test_free_quota_exhaustion_blocks_further_uses() {
    let storage = Arc::new(MemoryKeyValueStorage::new());
    let access = AccessController::new(storage, AccessConfig::default());

    for _ in 0..3 {
        assert!(access.record_use().await);
    }
    assert!(!access.record_use().await);
    assert_eq!(access.remaining_free_uses().await, 0);

    // Gated tiers stay closed; free content stays open.
    assert!(!access.can_access_tier(DifficultyTier::Advanced).await);
    assert!(access.can_access_tier(DifficultyTier::Beginner).await);
}

#[tokio::test]
async fn test_month_rollover_restores_quota() {
    let storage = Arc::new(MemoryKeyValueStorage::new());
    // A counter persisted in an earlier month with usage beyond the quota.
    let stale = UsageCounter {
        count: 5,
        month_key: "2021-06".to_string(),
        last_reset_millis: 1_622_548_800_000,
    };
    storage
        .set(USAGE_COUNTER_KEY, &serde_json::to_string(&stale).unwrap())
        .await
        .unwrap();

    let access = AccessController::new(storage, AccessConfig::default());
    assert_eq!(access.remaining_free_uses().await, 3);
    assert!(access.record_use().await);
    assert_eq!(access.remaining_free_uses().await, 2);
}

#[tokio::test]
async fn test_corrupt_state_fails_closed_but_keeps_free_tier() {
    let storage = Arc::new(MemoryKeyValueStorage::new());
    storage.set(SUBSCRIPTION_RECORD_KEY, "###").await.unwrap();
    storage.set(USAGE_COUNTER_KEY, "{broken").await.unwrap();

    let access = AccessController::new(storage, AccessConfig::default());
    assert!(!access.has_entitlement().await);
    // Broken usage state reads as zero usage, not zero quota.
    assert_eq!(access.remaining_free_uses().await, 3);
    assert!(access.record_use().await);
}

#[tokio::test]
async fn test_custom_quota_is_honored() {
    let storage = Arc::new(MemoryKeyValueStorage::new());
    let access = AccessController::new(storage, AccessConfig::default().with_quota(1));

    assert_eq!(access.remaining_free_uses().await, 1);
    assert!(access.record_use().await);
    assert!(!access.record_use().await);
}

#[tokio::test]
async fn test_entitlement_survives_restart_on_file_storage() {
    let dir = tempfile::tempdir().unwrap();

    {
        let storage = Arc::new(FileKeyValueStorage::new(dir.path().to_path_buf()).unwrap());
        let access = AccessController::new(storage, AccessConfig::default());
        access
            .store_from_receipt(&fresh_receipt("tok_persist"))
            .await
            .unwrap();
        assert!(access.record_use().await || access.has_entitlement().await);
    }

    let storage = Arc::new(FileKeyValueStorage::new(dir.path().to_path_buf()).unwrap());
    let access = AccessController::new(storage, AccessConfig::default());
    assert!(access.has_entitlement().await);
    let record = access.load_subscription().await.unwrap();
    assert_eq!(record.purchase_token, "tok_persist");
}
