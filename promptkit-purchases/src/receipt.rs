//! Purchase receipts and the raw billing events they are built from.

use promptkit_lib::{Platform, ProductId};
use serde::{Deserialize, Serialize};

use crate::{BillingError, Result};

/// Raw purchase/restore callback as reported by the platform billing layer.
///
/// Field shapes follow the store SDKs: loosely typed strings, epoch
/// milliseconds for the purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingEvent {
    pub product_id: String,
    pub purchase_token: String,
    pub purchase_time_millis: i64,
    pub platform: String,
    pub receipt_data: String,
    pub signature: String,
}

/// One claimed purchase event, normalized for validation.
///
/// Never mutated after creation; the purchase token acts as the idempotency
/// key for duplicate detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseReceipt {
    pub purchase_token: String,
    pub product_id: ProductId,
    pub purchase_time_millis: i64,
    pub platform: Platform,
    /// Opaque store-issued receipt payload.
    pub raw_payload: String,
    /// Opaque store-issued signature over the payload.
    pub signature: String,
}

impl PurchaseReceipt {
    /// Create a receipt directly from its parts.
    pub fn new(
        purchase_token: impl Into<String>,
        product_id: ProductId,
        purchase_time_millis: i64,
        platform: Platform,
        raw_payload: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            purchase_token: purchase_token.into(),
            product_id,
            purchase_time_millis,
            platform,
            raw_payload: raw_payload.into(),
            signature: signature.into(),
        }
    }

    /// Normalize a raw billing callback into a receipt.
    ///
    /// Rejects events whose platform tag is not one of the supported stores;
    /// everything else is carried through for the validator to score.
    pub fn from_billing_event(event: BillingEvent) -> Result<Self> {
        let platform = event
            .platform
            .parse::<Platform>()
            .map_err(|e| BillingError::InvalidArgument(e.to_string()))?;
        Ok(Self {
            purchase_token: event.purchase_token,
            product_id: ProductId::new(event.product_id),
            purchase_time_millis: event.purchase_time_millis,
            platform,
            raw_payload: event.receipt_data,
            signature: event.signature,
        })
    }

    /// Check the structural invariants every receipt must satisfy.
    ///
    /// Returns the first missing or malformed required field. The platform
    /// tag is already guaranteed by the type.
    pub fn validate_structure(&self) -> std::result::Result<(), String> {
        if self.purchase_token.is_empty() {
            return Err("missing purchase token".to_string());
        }
        if self.product_id.as_str().is_empty() {
            return Err("missing product ID".to_string());
        }
        if self.raw_payload.is_empty() {
            return Err("missing receipt payload".to_string());
        }
        if self.purchase_time_millis <= 0 {
            return Err("missing or non-positive purchase timestamp".to_string());
        }
        Ok(())
    }
}
