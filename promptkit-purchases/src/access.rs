//! Entitlement evaluation: subscription state, tier gating, and the free
//! monthly quota.
//!
//! Every check fails closed: a missing, unreadable, or unparseable
//! subscription record means no entitlement, and a broken usage counter
//! reads as zero usage. Callers never see storage errors from this layer.

use std::sync::Arc;

use promptkit_lib::{DifficultyTier, KeyValueStorage};
use serde::{Deserialize, Serialize};

use crate::{
    AccessConfig, PurchaseReceipt, SubscriptionRecord, UsageCounter, SUBSCRIPTION_RECORD_KEY,
    USAGE_COUNTER_KEY,
};

/// Sentinel for "no quota applies" in [`AccessController::remaining_free_uses`].
pub const UNLIMITED_USES: i64 = -1;

/// Feature flags derived from the subscription state.
///
/// Purely a function of whether the user is premium; kept as an explicit
/// struct so UI layers get one stable shape to bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub create_custom_templates: bool,
    pub template_history: bool,
    pub rate_templates: bool,
    pub export_templates: bool,
    pub advanced_search: bool,
    pub premium_templates: bool,
    pub ad_free: bool,
}

impl Capabilities {
    pub fn for_premium(premium: bool) -> Self {
        Self {
            create_custom_templates: premium,
            template_history: premium,
            rate_templates: premium,
            export_templates: premium,
            advanced_search: premium,
            premium_templates: premium,
            ad_free: premium,
        }
    }
}

/// Evaluates what the current user may do, from locally persisted state.
pub struct AccessController {
    storage: Arc<dyn KeyValueStorage>,
    config: AccessConfig,
}

impl AccessController {
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: AccessConfig) -> Self {
        Self { storage, config }
    }

    /// Whether an unexpired, active subscription is on record.
    pub async fn has_entitlement(&self) -> bool {
        match self.load_subscription().await {
            Some(record) => record.is_active(chrono::Utc::now().timestamp_millis()),
            None => false,
        }
    }

    /// Whether the user may open templates of the given difficulty tier.
    ///
    /// Beginner content is always available; every other tier requires an
    /// active subscription. Gating is binary, not graduated by tier.
    pub async fn can_access_tier(&self, tier: DifficultyTier) -> bool {
        if tier.is_free() {
            return true;
        }
        self.has_entitlement().await
    }

    /// Free-tier uses left this month, or [`UNLIMITED_USES`] for premium.
    pub async fn remaining_free_uses(&self) -> i64 {
        if self.has_entitlement().await {
            return UNLIMITED_USES;
        }
        let now = chrono::Utc::now().timestamp_millis();
        let counter = self.load_usage(now).await;
        i64::from(counter.remaining(self.config.free_monthly_quota))
    }

    /// Consume one template use if access is granted.
    ///
    /// Premium users are always granted and leave the counter untouched.
    /// Free users are granted while quota remains; only granted uses are
    /// counted. Returns whether the use was granted.
    pub async fn record_use(&self) -> bool {
        if self.has_entitlement().await {
            return true;
        }
        let now = chrono::Utc::now().timestamp_millis();
        let mut counter = self.load_usage(now).await;
        if counter.remaining(self.config.free_monthly_quota) == 0 {
            return false;
        }
        counter.increment();
        self.persist_usage(&counter).await;
        true
    }

    /// Feature flags for the current subscription state.
    pub async fn capabilities(&self) -> Capabilities {
        Capabilities::for_premium(self.has_entitlement().await)
    }

    /// Persist the subscription observed in a validated receipt.
    pub async fn store_from_receipt(&self, receipt: &PurchaseReceipt) -> crate::Result<()> {
        self.store_subscription(&SubscriptionRecord::from_receipt(receipt))
            .await
    }

    /// Persist a subscription record verbatim.
    pub async fn store_subscription(&self, record: &SubscriptionRecord) -> crate::Result<()> {
        let raw = serde_json::to_string(record)?;
        self.storage.set(SUBSCRIPTION_RECORD_KEY, &raw).await?;
        Ok(())
    }

    /// The persisted subscription record, if one parses.
    pub async fn load_subscription(&self) -> Option<SubscriptionRecord> {
        match self.storage.get(SUBSCRIPTION_RECORD_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Corrupt subscription record, denying access: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read subscription record, denying access: {}", e);
                None
            }
        }
    }

    async fn load_usage(&self, now_millis: i64) -> UsageCounter {
        let counter = match self.storage.get(USAGE_COUNTER_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Corrupt usage counter, resetting: {}", e);
                UsageCounter::new(now_millis)
            }),
            Ok(None) => UsageCounter::new(now_millis),
            Err(e) => {
                tracing::warn!("Failed to read usage counter, assuming zero usage: {}", e);
                UsageCounter::new(now_millis)
            }
        };
        counter.rolled_over(now_millis)
    }

    async fn persist_usage(&self, counter: &UsageCounter) {
        let raw = match serde_json::to_string(counter) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize usage counter: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(USAGE_COUNTER_KEY, &raw).await {
            tracing::warn!("Failed to persist usage counter: {}", e);
        }
    }
}
