//! Platform signature verification port.
//!
//! Each store platform signs its receipts differently, so verification is a
//! pluggable capability rather than a hard-coded check. None of the shipped
//! implementations verify real cryptography yet; they accept every receipt
//! and, in production mode, log that the check is not enforced. Tests pin
//! that behavior down so the gap stays visible.

use async_trait::async_trait;
use promptkit_lib::Platform;

use crate::{PurchaseReceipt, Result};

/// Verifies the store-issued signature over a receipt payload.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Returns `Ok(true)` when the signature is acceptable for the receipt.
    async fn verify(&self, receipt: &PurchaseReceipt) -> Result<bool>;
}

/// Accept-all verifier for non-production environments.
pub struct StubSignatureVerifier {
    production_mode: bool,
}

impl StubSignatureVerifier {
    pub fn new(production_mode: bool) -> Self {
        Self { production_mode }
    }
}

#[async_trait]
impl SignatureVerifier for StubSignatureVerifier {
    async fn verify(&self, receipt: &PurchaseReceipt) -> Result<bool> {
        if self.production_mode {
            tracing::warn!(
                "Signature for {} on {} accepted without cryptographic verification",
                receipt.purchase_token,
                receipt.platform
            );
        }
        Ok(true)
    }
}

/// App Store receipt verification.
///
/// TODO: verify the PKCS#7 receipt container against Apple's root
/// certificate once the app ships a pinned copy of it.
pub struct AppStoreSignatureVerifier {
    production_mode: bool,
}

impl AppStoreSignatureVerifier {
    pub fn new(production_mode: bool) -> Self {
        Self { production_mode }
    }
}

#[async_trait]
impl SignatureVerifier for AppStoreSignatureVerifier {
    async fn verify(&self, receipt: &PurchaseReceipt) -> Result<bool> {
        if receipt.platform != Platform::AppStore {
            return Ok(false);
        }
        if self.production_mode {
            tracing::warn!(
                "App Store signature for {} accepted without cryptographic verification",
                receipt.purchase_token
            );
        }
        Ok(true)
    }
}

/// Google Play purchase-data verification.
///
/// TODO: verify the RSA signature against the Play Console license key once
/// it is provisioned into the app config.
pub struct GooglePlaySignatureVerifier {
    production_mode: bool,
}

impl GooglePlaySignatureVerifier {
    pub fn new(production_mode: bool) -> Self {
        Self { production_mode }
    }
}

#[async_trait]
impl SignatureVerifier for GooglePlaySignatureVerifier {
    async fn verify(&self, receipt: &PurchaseReceipt) -> Result<bool> {
        if receipt.platform != Platform::GooglePlay {
            return Ok(false);
        }
        if self.production_mode {
            tracing::warn!(
                "Google Play signature for {} accepted without cryptographic verification",
                receipt.purchase_token
            );
        }
        Ok(true)
    }
}
