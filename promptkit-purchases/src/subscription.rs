//! Local subscription record.
//!
//! One record per device, written on a successful purchase or restore and
//! never deleted; staleness is detected by comparing the stored expiry to
//! the current time, not by mutating the record.

use promptkit_lib::{Platform, ProductId};
use serde::{Deserialize, Serialize};

use crate::PurchaseReceipt;

/// Storage key for the serialized subscription record.
pub const SUBSCRIPTION_RECORD_KEY: &str = "subscription-record";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1_000;

/// Lifecycle state reported by the store at purchase time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
    GracePeriod,
}

/// The locally persisted subscription, as last observed from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionRecord {
    pub product_id: ProductId,
    pub purchase_token: String,
    pub platform: Platform,
    pub purchased_at_millis: i64,
    pub expires_at_millis: i64,
    pub status: SubscriptionStatus,
}

impl SubscriptionRecord {
    /// Build a record from a validated receipt.
    ///
    /// Expiry is derived from the plan period: monthly plans run 30 days
    /// from the purchase timestamp, yearly plans 365.
    pub fn from_receipt(receipt: &PurchaseReceipt) -> Self {
        let period_days = if receipt.product_id == ProductId::pro_yearly() {
            365
        } else {
            30
        };
        Self {
            product_id: receipt.product_id.clone(),
            purchase_token: receipt.purchase_token.clone(),
            platform: receipt.platform,
            purchased_at_millis: receipt.purchase_time_millis,
            expires_at_millis: receipt.purchase_time_millis + period_days * MILLIS_PER_DAY,
            status: SubscriptionStatus::Active,
        }
    }

    /// Whether the subscription grants access at `now_millis`.
    ///
    /// A record whose status is still `Active` but whose expiry has passed
    /// does not grant access; the stored status only reflects what the
    /// store said at purchase time.
    pub fn is_active(&self, now_millis: i64) -> bool {
        self.status == SubscriptionStatus::Active && now_millis < self.expires_at_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(product: ProductId, purchase_time: i64) -> PurchaseReceipt {
        PurchaseReceipt::new(
            "token-1",
            product,
            purchase_time,
            Platform::GooglePlay,
            r#"{"orderId":"order-1"}"#,
            "sig-1",
        )
    }

    #[test]
    fn test_monthly_expiry_window() {
        let record = SubscriptionRecord::from_receipt(&receipt(ProductId::pro_monthly(), 1_000));
        assert_eq!(record.expires_at_millis, 1_000 + 30 * MILLIS_PER_DAY);
        assert_eq!(record.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_yearly_expiry_window() {
        let record = SubscriptionRecord::from_receipt(&receipt(ProductId::pro_yearly(), 1_000));
        assert_eq!(record.expires_at_millis, 1_000 + 365 * MILLIS_PER_DAY);
    }

    #[test]
    fn test_active_before_expiry() {
        let record = SubscriptionRecord::from_receipt(&receipt(ProductId::pro_monthly(), 0));
        assert!(record.is_active(29 * MILLIS_PER_DAY));
    }

    #[test]
    fn test_expired_record_is_not_active_even_when_status_says_so() {
        let record = SubscriptionRecord::from_receipt(&receipt(ProductId::pro_monthly(), 0));
        assert_eq!(record.status, SubscriptionStatus::Active);
        assert!(!record.is_active(31 * MILLIS_PER_DAY));
    }

    #[test]
    fn test_cancelled_record_is_not_active() {
        let mut record = SubscriptionRecord::from_receipt(&receipt(ProductId::pro_monthly(), 0));
        record.status = SubscriptionStatus::Cancelled;
        assert!(!record.is_active(1));
    }

    #[test]
    fn test_serde_round_trip() {
        let record = SubscriptionRecord::from_receipt(&receipt(ProductId::pro_yearly(), 42));
        let raw = serde_json::to_string(&record).unwrap();
        assert!(raw.contains("\"active\""));
        let back: SubscriptionRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, record);
    }
}
