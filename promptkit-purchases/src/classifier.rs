//! Billing error taxonomy and classification.
//!
//! Classification is a two-stage process: heterogeneous SDK failures are
//! first normalized into a [`BillingFault`](crate::BillingFault), then
//! [`classify`] maps the fault onto a fixed set of error kinds. The first
//! matching predicate wins; the kind fully determines default retryability
//! and the guidance templates.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use promptkit_lib::KeyValueStorage;
use serde::{Deserialize, Serialize};

use crate::{locale, BillingFault, ErrorHistory, Locale, RetryStrategy};

/// The fixed billing error taxonomy, in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseErrorKind {
    UserCancelled,
    PaymentMethod,
    NetworkError,
    ValidationFailed,
    BillingUnavailable,
    ProductUnavailable,
    ServerError,
    UnknownError,
}

impl PurchaseErrorKind {
    /// Machine code for FFI and analytics.
    pub fn code(&self) -> i32 {
        match self {
            Self::NetworkError => 2000,
            Self::ProductUnavailable => 4001,
            Self::ValidationFailed => 5001,
            Self::UserCancelled => 6001,
            Self::PaymentMethod => 6002,
            Self::BillingUnavailable => 6003,
            Self::ServerError => 9000,
            Self::UnknownError => 9999,
        }
    }

    /// Default retryability. Only validation failures and unavailable
    /// products are terminal.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ValidationFailed | Self::ProductUnavailable)
    }
}

/// Classify a normalized billing fault.
///
/// Pure function; the first matching predicate in precedence order wins.
pub fn classify(fault: &BillingFault) -> PurchaseErrorKind {
    let msg = fault.message_lower();
    let code = fault.code_lower();
    let has = |needle: &str| msg.contains(needle);

    // 1. Explicit user cancellation ("cancel" covers cancelled/canceled/
    //    cancellation; code "1" is the Play Billing USER_CANCELED response).
    if has("cancel") || code.contains("cancel") || code == "1" {
        return PurchaseErrorKind::UserCancelled;
    }

    // 2. Payment method problems. "billing" alone also appears in
    //    service-outage wording, so it only counts here without
    //    "unavailable".
    if has("payment")
        || has("card")
        || has("insufficient funds")
        || has("declined")
        || (has("billing") && !has("unavailable"))
        || code.starts_with("payment")
    {
        return PurchaseErrorKind::PaymentMethod;
    }

    // 3. Connectivity.
    if has("network")
        || has("internet")
        || has("connection")
        || has("timeout")
        || has("timed out")
        || fault.aborted
        || code.contains("network")
    {
        return PurchaseErrorKind::NetworkError;
    }

    // 4. Receipt/signature validation.
    if has("validation")
        || has("signature")
        || has("receipt")
        || has("security")
        || code.starts_with("validation")
    {
        return PurchaseErrorKind::ValidationFailed;
    }

    // 5. Store service outage (code "3" is Play's BILLING_UNAVAILABLE).
    if (has("billing") && has("unavailable"))
        || has("service unavailable")
        || has("services unavailable")
        || code.contains("billing_unavailable")
        || code == "3"
    {
        return PurchaseErrorKind::BillingUnavailable;
    }

    // 6. Unknown or delisted product (code "4" is Play's ITEM_UNAVAILABLE).
    if ((has("product") || has("item")) && (has("unavailable") || has("not found")))
        || code.contains("item_unavailable")
        || code.contains("product_unavailable")
        || code == "4"
    {
        return PurchaseErrorKind::ProductUnavailable;
    }

    // 7. Backend failure (HTTP 5xx or server wording).
    if has("server")
        || fault.status.is_some_and(|s| s >= 500)
        || code.parse::<u16>().is_ok_and(|c| (500..600).contains(&c))
    {
        return PurchaseErrorKind::ServerError;
    }

    PurchaseErrorKind::UnknownError
}

/// One classified error record. Immutable once created; appended to the
/// bounded error history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseError {
    pub error_id: String,
    pub kind: PurchaseErrorKind,
    pub code: i32,
    /// Internal message (original fault text plus context).
    pub message: String,
    /// Localized user-facing headline.
    pub user_message: String,
    pub details: BTreeMap<String, String>,
    pub timestamp_millis: i64,
    pub retryable: bool,
    /// What the user can do next, when a retry can help.
    pub user_action: Option<String>,
    /// What support should be told, for terminal failures.
    pub support_action: Option<String>,
}

/// Full classification output handed to the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedError {
    pub error: PurchaseError,
    pub should_retry: bool,
    pub retry: RetryStrategy,
    pub user_guidance: Vec<String>,
    pub technical_details: String,
}

impl ClassifiedError {
    /// Fallback shape for a failure inside the handler itself: retry
    /// disabled, generic support-contact instruction.
    pub fn handler_failure(locale: Locale, context: &str) -> Self {
        let kind = PurchaseErrorKind::UnknownError;
        let error = PurchaseError {
            error_id: uuid::Uuid::new_v4().to_string(),
            kind,
            code: kind.code(),
            message: format!("error handler failed in {}", context),
            user_message: locale.user_message(kind).to_string(),
            details: BTreeMap::new(),
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
            retryable: false,
            user_action: None,
            support_action: Some("Contact support and mention a billing handler failure".to_string()),
        };
        Self {
            error,
            should_retry: false,
            retry: RetryStrategy::none(),
            user_guidance: vec![
                "Contact support with the time this happened".to_string(),
                "Include what you were trying to purchase".to_string(),
            ],
            technical_details: format!("handler failure; context={}", context),
        }
    }
}

/// Turns raw billing failures into classified, user-presentable errors and
/// keeps the persisted error history.
///
/// Explicitly constructed and dependency-injected; hold one per app session.
pub struct PurchaseErrorHandler {
    locale: Locale,
    history: ErrorHistory,
}

impl PurchaseErrorHandler {
    pub fn new(storage: Arc<dyn KeyValueStorage>, locale: Locale) -> Self {
        Self {
            locale,
            history: ErrorHistory::new(storage),
        }
    }

    /// Access the persisted error history.
    pub fn history(&self) -> &ErrorHistory {
        &self.history
    }

    /// Classify a normalized fault.
    ///
    /// Total from the caller's perspective: a failure inside classification
    /// yields the handler-failure fallback instead of propagating, and
    /// history persistence problems are swallowed.
    pub async fn handle(&self, fault: &BillingFault, context: &str) -> ClassifiedError {
        let classified =
            match std::panic::catch_unwind(AssertUnwindSafe(|| self.build(fault, context))) {
                Ok(classified) => classified,
                Err(_) => {
                    tracing::warn!("Purchase error handler panicked in context {}", context);
                    ClassifiedError::handler_failure(self.locale, context)
                }
            };
        self.history.append(&classified.error).await;
        classified
    }

    /// Classify a loosely-shaped SDK error payload.
    pub async fn handle_value(
        &self,
        value: &serde_json::Value,
        context: &str,
    ) -> ClassifiedError {
        let fault = BillingFault::from_value(value);
        self.handle(&fault, context).await
    }

    fn build(&self, fault: &BillingFault, context: &str) -> ClassifiedError {
        let kind = classify(fault);
        let retry = RetryStrategy::for_kind(kind);
        let retryable = kind.is_retryable();

        let mut details = BTreeMap::new();
        details.insert("context".to_string(), context.to_string());
        if let Some(code) = &fault.code {
            details.insert("raw_code".to_string(), code.clone());
        }
        if let Some(status) = fault.status {
            details.insert("http_status".to_string(), status.to_string());
        }
        if fault.aborted {
            details.insert("aborted".to_string(), "true".to_string());
        }

        let raw_message = fault.message.clone().unwrap_or_else(|| "<no message>".to_string());
        let guidance: Vec<String> = locale::guidance(kind)
            .into_iter()
            .map(str::to_string)
            .collect();

        let user_action = if retryable {
            guidance.first().cloned()
        } else {
            None
        };
        let support_action = if retryable {
            None
        } else {
            Some("Contact support with your order details".to_string())
        };

        let error = PurchaseError {
            error_id: uuid::Uuid::new_v4().to_string(),
            kind,
            code: kind.code(),
            message: format!("{}: {}", context, raw_message),
            user_message: self.locale.user_message(kind).to_string(),
            details,
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
            retryable,
            user_action,
            support_action,
        };

        let technical_details = format!(
            "kind={:?} code={} context={} message={:?} raw_code={:?} status={:?}",
            kind, error.code, context, fault.message, fault.code, fault.status
        );

        ClassifiedError {
            error,
            should_retry: retry.should_retry,
            retry,
            user_guidance: guidance,
            technical_details,
        }
    }
}
