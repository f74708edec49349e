//! Purchase ledger for duplicate-purchase detection.
//!
//! The ledger is the persisted list of previously validated receipts. A
//! replayed purchase token, or the same product bought again on the same
//! platform within a short window, counts as a duplicate.
//!
//! # Properties
//!
//! - Bounded to the most recent `ledger_capacity` entries (oldest evicted)
//! - Entries older than the maximum receipt age are purged on every read
//! - Storage failures are logged and swallowed; duplicate detection then
//!   degrades silently instead of aborting validation

use std::sync::Arc;

use promptkit_lib::{KeyValueStorage, Platform, ProductId};
use serde::{Deserialize, Serialize};

use crate::{PurchaseReceipt, ValidationConfig};

/// Storage key under which the ledger is persisted as a JSON array.
pub const PURCHASE_LEDGER_KEY: &str = "validated-purchases";

/// One validated purchase retained for duplicate detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub purchase_token: String,
    pub product_id: ProductId,
    pub platform: Platform,
    pub purchase_time_millis: i64,
    pub recorded_at_millis: i64,
}

impl LedgerEntry {
    fn from_receipt(receipt: &PurchaseReceipt, now_millis: i64) -> Self {
        Self {
            purchase_token: receipt.purchase_token.clone(),
            product_id: receipt.product_id.clone(),
            platform: receipt.platform,
            purchase_time_millis: receipt.purchase_time_millis,
            recorded_at_millis: now_millis,
        }
    }
}

/// Persisted, bounded ledger of validated purchases.
///
/// Every operation is a single read-compute-write sequence against the
/// injected storage, so concurrent UI call sites cannot interleave partial
/// updates.
pub struct PurchaseLedger {
    storage: Arc<dyn KeyValueStorage>,
    max_age_ms: i64,
    duplicate_window_ms: i64,
    capacity: usize,
}

impl PurchaseLedger {
    /// Create a ledger over the given storage, taking its bounds from the
    /// validation config.
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: &ValidationConfig) -> Self {
        Self {
            storage,
            max_age_ms: config.max_receipt_age_ms,
            duplicate_window_ms: config.duplicate_window_ms,
            capacity: config.ledger_capacity,
        }
    }

    /// Check whether a receipt duplicates an existing ledger entry.
    ///
    /// Same purchase token, or same product + platform within the duplicate
    /// window of an existing entry.
    pub async fn is_duplicate(&self, receipt: &PurchaseReceipt) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        let entries = self.load(now).await;
        entries.iter().any(|entry| {
            entry.purchase_token == receipt.purchase_token
                || (entry.product_id == receipt.product_id
                    && entry.platform == receipt.platform
                    && (entry.purchase_time_millis - receipt.purchase_time_millis).abs()
                        <= self.duplicate_window_ms)
        })
    }

    /// Append a validated receipt, evicting the oldest entries beyond
    /// capacity, and persist the result.
    pub async fn record(&self, receipt: &PurchaseReceipt) {
        let now = chrono::Utc::now().timestamp_millis();
        let mut entries = self.load(now).await;
        entries.push(LedgerEntry::from_receipt(receipt, now));
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        self.persist(&entries).await;
    }

    /// Current ledger contents with expired entries purged.
    pub async fn entries(&self) -> Vec<LedgerEntry> {
        let now = chrono::Utc::now().timestamp_millis();
        self.load(now).await
    }

    /// Number of live ledger entries (for monitoring/debugging).
    pub async fn len(&self) -> usize {
        self.entries().await.len()
    }

    /// Whether the ledger has no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Load the persisted ledger, dropping entries older than the maximum
    /// receipt age. Corrupt or unreadable state degrades to an empty ledger.
    async fn load(&self, now_millis: i64) -> Vec<LedgerEntry> {
        let raw = match self.storage.get(PURCHASE_LEDGER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read purchase ledger: {}", e);
                return Vec::new();
            }
        };
        let mut entries: Vec<LedgerEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding corrupt purchase ledger: {}", e);
                return Vec::new();
            }
        };
        entries.retain(|entry| now_millis - entry.purchase_time_millis <= self.max_age_ms);
        entries
    }

    async fn persist(&self, entries: &[LedgerEntry]) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize purchase ledger: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(PURCHASE_LEDGER_KEY, &json).await {
            tracing::warn!("Failed to persist purchase ledger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptkit_lib::MemoryKeyValueStorage;

    fn receipt(token: &str, product: &str, time_millis: i64) -> PurchaseReceipt {
        PurchaseReceipt::new(
            token,
            ProductId::new(product),
            time_millis,
            Platform::GooglePlay,
            "payload",
            "sig",
        )
    }

    fn ledger() -> PurchaseLedger {
        PurchaseLedger::new(
            Arc::new(MemoryKeyValueStorage::new()),
            &ValidationConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_fresh_receipt_not_duplicate() {
        let ledger = ledger();
        let now = chrono::Utc::now().timestamp_millis();
        let r = receipt("t1", "pro_plan_monthly", now);

        assert!(!ledger.is_duplicate(&r).await);
        ledger.record(&r).await;
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_replayed_token_is_duplicate() {
        let ledger = ledger();
        let now = chrono::Utc::now().timestamp_millis();
        let r = receipt("t1", "pro_plan_monthly", now);

        ledger.record(&r).await;
        assert!(ledger.is_duplicate(&r).await);

        // Same token with a different product is still a duplicate.
        let other = receipt("t1", "pro_plan_yearly", now);
        assert!(ledger.is_duplicate(&other).await);
    }

    #[tokio::test]
    async fn test_same_product_within_window_is_duplicate() {
        let ledger = ledger();
        let now = chrono::Utc::now().timestamp_millis();

        ledger.record(&receipt("t1", "pro_plan_monthly", now)).await;

        // Different token, same product + platform, 30s later.
        let near = receipt("t2", "pro_plan_monthly", now + 30_000);
        assert!(ledger.is_duplicate(&near).await);

        // Outside the 60s window it is a legitimate repurchase.
        let far = receipt("t3", "pro_plan_monthly", now + 120_000);
        assert!(!ledger.is_duplicate(&far).await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        let config = ValidationConfig {
            ledger_capacity: 3,
            duplicate_window_ms: 0,
            ..ValidationConfig::default()
        };
        let ledger = PurchaseLedger::new(storage, &config);
        let now = chrono::Utc::now().timestamp_millis();

        for i in 0..5 {
            ledger
                .record(&receipt(&format!("t{}", i), &format!("p{}", i), now + i))
                .await;
        }

        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].purchase_token, "t2");
        assert_eq!(entries[2].purchase_token, "t4");
    }

    #[tokio::test]
    async fn test_expired_entries_purged_on_read() {
        let ledger = ledger();
        let now = chrono::Utc::now().timestamp_millis();
        let stale = now - ValidationConfig::DEFAULT_MAX_RECEIPT_AGE_MS - 1_000;

        ledger.record(&receipt("old", "pro_plan_monthly", stale)).await;
        ledger.record(&receipt("new", "pro_plan_yearly", now)).await;

        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].purchase_token, "new");

        // The purged token no longer counts as a duplicate.
        assert!(!ledger.is_duplicate(&receipt("old", "pro_plan_monthly", stale)).await);
    }

    #[tokio::test]
    async fn test_corrupt_ledger_degrades_to_empty() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        storage.set(PURCHASE_LEDGER_KEY, "not json").await.unwrap();

        let ledger = PurchaseLedger::new(storage, &ValidationConfig::default());
        assert!(ledger.is_empty().await);

        let now = chrono::Utc::now().timestamp_millis();
        assert!(!ledger.is_duplicate(&receipt("t1", "pro_plan_monthly", now)).await);
    }

    #[tokio::test]
    async fn test_ledger_persists_across_instances() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        let config = ValidationConfig::default();
        let now = chrono::Utc::now().timestamp_millis();

        let first = PurchaseLedger::new(storage.clone(), &config);
        first.record(&receipt("t1", "pro_plan_monthly", now)).await;

        let second = PurchaseLedger::new(storage, &config);
        assert!(second.is_duplicate(&receipt("t1", "pro_plan_monthly", now)).await);
    }
}
