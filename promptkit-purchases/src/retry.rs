//! Retry policy derived from the error classification.
//!
//! Exact delays are configuration defaults, not contracts; what callers may
//! rely on is the ordering (network retries sooner than server errors,
//! which retry sooner than an unavailable billing service) and that
//! cancellation and payment issues retry immediately, once.

use serde::{Deserialize, Serialize};

use crate::PurchaseErrorKind;

/// How a caller should retry after a classified failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryStrategy {
    pub should_retry: bool,
    /// Delay before the next attempt, milliseconds.
    pub delay_ms: u64,
    /// Suggested total number of attempts.
    pub max_attempts: u32,
}

impl RetryStrategy {
    /// Terminal failures: do not retry.
    pub fn none() -> Self {
        Self {
            should_retry: false,
            delay_ms: 0,
            max_attempts: 0,
        }
    }

    fn after(delay_ms: u64, max_attempts: u32) -> Self {
        Self {
            should_retry: true,
            delay_ms,
            max_attempts,
        }
    }

    /// Default retry strategy for an error kind.
    pub fn for_kind(kind: PurchaseErrorKind) -> Self {
        match kind {
            // Transient connectivity: retry quickly, several attempts.
            PurchaseErrorKind::NetworkError => Self::after(1_000, 3),
            // Backend hiccup: give it a moment.
            PurchaseErrorKind::ServerError => Self::after(5_000, 2),
            // Store service down: back off properly.
            PurchaseErrorKind::BillingUnavailable => Self::after(30_000, 2),
            // The user can simply try again right away.
            PurchaseErrorKind::UserCancelled | PurchaseErrorKind::PaymentMethod => {
                Self::after(0, 1)
            }
            PurchaseErrorKind::UnknownError => Self::after(3_000, 1),
            // Terminal: a retry cannot change the outcome.
            PurchaseErrorKind::ValidationFailed | PurchaseErrorKind::ProductUnavailable => {
                Self::none()
            }
        }
    }
}
