//! Validation and access-control configuration.
//!
//! Score thresholds and per-stage penalties are tunable defaults, not
//! contracts. The relative weighting (signature > catalog > duplicate >
//! timestamp) is what matters to callers.

use serde::{Deserialize, Serialize};

/// Configuration for the receipt validation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    /// Master switch; when false every receipt passes with a warning.
    pub receipt_validation_enabled: bool,
    /// When false the signature stage is skipped entirely.
    pub signature_validation_enabled: bool,
    /// Server-side validation is not implemented; this stays false.
    pub server_side_validation: bool,
    /// Whether signature stubs should log their production caveat.
    pub production_mode: bool,
    /// Receipts older than this are flagged as stale.
    pub max_receipt_age_ms: i64,
    /// Tolerated clock skew for receipts timestamped in the future.
    pub future_skew_tolerance_ms: i64,
    /// Receipts scoring below this are invalid regardless of stage results.
    pub min_security_score: u8,
    /// Window in which same product + platform counts as a duplicate.
    pub duplicate_window_ms: i64,
    /// Maximum number of ledger entries retained.
    pub ledger_capacity: usize,
    /// Score penalty for a product ID missing from the catalog.
    pub unknown_product_penalty: u8,
    /// Score penalty for a stale or future-dated purchase timestamp.
    pub stale_timestamp_penalty: u8,
    /// Score penalty for a failed platform signature check.
    pub signature_penalty: u8,
    /// Score penalty for a duplicate purchase.
    pub duplicate_penalty: u8,
}

impl ValidationConfig {
    /// 30 days, the default maximum receipt age.
    pub const DEFAULT_MAX_RECEIPT_AGE_MS: i64 = 30 * 24 * 60 * 60 * 1000;

    /// 5 minutes of tolerated forward clock skew.
    pub const DEFAULT_FUTURE_SKEW_MS: i64 = 5 * 60 * 1000;

    /// Set the minimum security score.
    pub fn with_min_score(mut self, score: u8) -> Self {
        self.min_security_score = score;
        self
    }

    /// Set the maximum receipt age.
    pub fn with_max_receipt_age_ms(mut self, age_ms: i64) -> Self {
        self.max_receipt_age_ms = age_ms;
        self
    }

    /// Enable or disable the signature stage.
    pub fn with_signature_validation(mut self, enabled: bool) -> Self {
        self.signature_validation_enabled = enabled;
        self
    }

    /// Mark the config as running in production.
    pub fn with_production_mode(mut self, production: bool) -> Self {
        self.production_mode = production;
        self
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            receipt_validation_enabled: true,
            signature_validation_enabled: true,
            server_side_validation: false,
            production_mode: false,
            max_receipt_age_ms: Self::DEFAULT_MAX_RECEIPT_AGE_MS,
            future_skew_tolerance_ms: Self::DEFAULT_FUTURE_SKEW_MS,
            min_security_score: 70,
            duplicate_window_ms: 60_000,
            ledger_capacity: 100,
            unknown_product_penalty: 30,
            stale_timestamp_penalty: 20,
            signature_penalty: 40,
            duplicate_penalty: 25,
        }
    }
}

/// Configuration for free-tier access control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessConfig {
    /// Free template uses allowed per calendar month.
    pub free_monthly_quota: u32,
}

impl AccessConfig {
    /// Set the monthly quota.
    pub fn with_quota(mut self, quota: u32) -> Self {
        self.free_monthly_quota = quota;
        self
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            free_monthly_quota: 3,
        }
    }
}
