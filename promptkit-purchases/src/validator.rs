//! Receipt validation pipeline.
//!
//! Validation is a scored pipeline: each stage can deduct a configured
//! penalty from the running security score or, for structural failures,
//! short-circuit to invalid. The final verdict compares the score against
//! the configured minimum. From the caller's perspective `validate_receipt`
//! is total: it never panics and never returns an error.

use std::sync::Arc;

use promptkit_lib::{KeyValueStorage, ProductCatalog};
use serde::{Deserialize, Serialize};

use crate::{
    ledger::PurchaseLedger, PurchaseReceipt, SignatureVerifier, StubSignatureVerifier,
    ValidationConfig,
};

/// Outcome of validating one receipt.
///
/// Computed once per call and never persisted; on success only the input
/// receipt is recorded in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    /// Hard failure reason, set only when a stage short-circuited.
    pub error: Option<String>,
    pub warnings: Vec<String>,
    /// Heuristic confidence in [0, 100].
    pub security_score: u8,
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    /// Hard rejection: structural failure, score 0, no further stages.
    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
            warnings: Vec::new(),
            security_score: 0,
            recommendations: Vec::new(),
        }
    }

    /// Unexpected internal failure, reported as an invalid result rather
    /// than propagated.
    fn system_failure(detail: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(format!("validation failed internally: {}", detail.into())),
            warnings: Vec::new(),
            security_score: 0,
            recommendations: vec![
                "Contact support with your purchase details".to_string(),
            ],
        }
    }
}

/// Validates purchase receipts and maintains the purchase ledger.
///
/// Explicitly constructed and dependency-injected; hold one per app session
/// and share it between call sites.
pub struct ReceiptValidator {
    config: ValidationConfig,
    catalog: ProductCatalog,
    ledger: PurchaseLedger,
    verifier: Arc<dyn SignatureVerifier>,
}

impl ReceiptValidator {
    /// Create a validator with an explicit signature verifier.
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        config: ValidationConfig,
        catalog: ProductCatalog,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        let ledger = PurchaseLedger::new(storage, &config);
        Self {
            config,
            catalog,
            ledger,
            verifier,
        }
    }

    /// Create a validator with the stub verifier and default catalog.
    pub fn with_defaults(storage: Arc<dyn KeyValueStorage>, config: ValidationConfig) -> Self {
        let verifier = Arc::new(StubSignatureVerifier::new(config.production_mode));
        Self::new(storage, config, ProductCatalog::default(), verifier)
    }

    /// Access the underlying ledger (mainly for diagnostics and tests).
    pub fn ledger(&self) -> &PurchaseLedger {
        &self.ledger
    }

    /// Validate a receipt against the full pipeline.
    ///
    /// Stage order: structural check (short-circuits), catalog membership,
    /// timestamp window, platform signature, duplicate detection, final
    /// verdict. Successful non-duplicate receipts are appended to the
    /// ledger.
    pub async fn validate_receipt(&self, receipt: &PurchaseReceipt) -> ValidationResult {
        if !self.config.receipt_validation_enabled {
            return ValidationResult {
                valid: true,
                error: None,
                warnings: vec!["Receipt validation is disabled".to_string()],
                security_score: 100,
                recommendations: Vec::new(),
            };
        }
        if self.config.server_side_validation {
            // Config option recognized but intentionally unsupported.
            tracing::debug!("Server-side validation requested; only client-side checks run");
        }

        // Stage 1: structural check, the only short-circuiting stage.
        if let Err(reason) = receipt.validate_structure() {
            return ValidationResult::rejected(reason);
        }

        let mut score: i32 = 100;
        let mut warnings = Vec::new();
        let mut recommendations = Vec::new();

        // Stage 2: product catalog membership.
        if !self.catalog.contains(&receipt.product_id) {
            score -= i32::from(self.config.unknown_product_penalty);
            warnings.push(format!(
                "Product {} is not in the known catalog",
                receipt.product_id
            ));
            recommendations
                .push("Confirm the product is still offered before honoring it".to_string());
        }

        // Stage 3: timestamp window.
        let now = chrono::Utc::now().timestamp_millis();
        let age = now - receipt.purchase_time_millis;
        if age > self.config.max_receipt_age_ms {
            score -= i32::from(self.config.stale_timestamp_penalty);
            warnings.push("Purchase timestamp is older than the accepted window".to_string());
            recommendations.push("Use Restore Purchases for older transactions".to_string());
        } else if receipt.purchase_time_millis - now > self.config.future_skew_tolerance_ms {
            score -= i32::from(self.config.stale_timestamp_penalty);
            warnings.push("Purchase timestamp is in the future".to_string());
            recommendations.push("Check the device clock and retry".to_string());
        }

        // Stage 4: platform signature.
        if self.config.signature_validation_enabled {
            let signature_ok = match self.verifier.verify(receipt).await {
                Ok(ok) => ok,
                Err(e) => {
                    tracing::warn!(
                        "Signature verifier failed for {}: {}",
                        receipt.purchase_token,
                        e
                    );
                    false
                }
            };
            if !signature_ok {
                score -= i32::from(self.config.signature_penalty);
                warnings.push("Platform signature verification failed".to_string());
                recommendations
                    .push("Contact support to verify this purchase manually".to_string());
            }
        }

        // Stage 5: duplicate detection. Flags and deducts, never
        // short-circuits.
        let duplicate = self.ledger.is_duplicate(receipt).await;
        if duplicate {
            score -= i32::from(self.config.duplicate_penalty);
            warnings.push("Duplicate purchase detected".to_string());
            recommendations
                .push("Use Restore Purchases instead of buying the product again".to_string());
        }

        // Stage 6: final verdict.
        let security_score = score.clamp(0, 100) as u8;
        let valid = security_score >= self.config.min_security_score;

        if valid && !duplicate {
            self.ledger.record(receipt).await;
        }

        ValidationResult {
            valid,
            error: None,
            warnings,
            security_score,
            recommendations,
        }
    }

    /// Validate a receipt, reporting any panic from a misbehaving verifier
    /// implementation as a system-level invalid result.
    pub async fn validate_receipt_guarded(&self, receipt: &PurchaseReceipt) -> ValidationResult {
        use futures::FutureExt;
        use std::panic::AssertUnwindSafe;

        match AssertUnwindSafe(self.validate_receipt(receipt))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => ValidationResult::system_failure("validator panicked"),
        }
    }
}
