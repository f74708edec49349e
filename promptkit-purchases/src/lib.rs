//! # Promptkit Purchases
//!
//! Client-side purchase validation and entitlement evaluation for the
//! prompt-template marketplace.
//!
//! ## Trust Model (v0.2.0)
//!
//! All validation happens on the device; there is no server round-trip.
//! Key properties:
//! - Receipt validation is a scored pipeline (structural, catalog, temporal,
//!   signature, duplicate stages) that never panics and never returns `Err`
//! - Duplicate purchases are detected against a bounded, persisted ledger
//! - Entitlement checks fail closed: missing or corrupt local state always
//!   denies access
//! - Billing errors from platform SDKs are normalized into `BillingFault`
//!   before classification, so the classifier itself is a pure function
//!
//! Platform signature verification is a pluggable port
//! ([`SignatureVerifier`]) and is not yet cryptographically enforced.

pub mod access;
pub mod classifier;
pub mod config;
pub mod fault;
pub mod history;
pub mod ledger;
pub mod locale;
pub mod receipt;
pub mod retry;
pub mod signature;
pub mod subscription;
pub mod usage;
pub mod validator;

pub use access::{AccessController, Capabilities, UNLIMITED_USES};
pub use classifier::{classify, ClassifiedError, PurchaseError, PurchaseErrorHandler, PurchaseErrorKind};
pub use config::{AccessConfig, ValidationConfig};
pub use fault::BillingFault;
pub use history::ErrorHistory;
pub use ledger::{LedgerEntry, PurchaseLedger};
pub use locale::Locale;
pub use receipt::{BillingEvent, PurchaseReceipt};
pub use retry::RetryStrategy;
pub use signature::{
    AppStoreSignatureVerifier, GooglePlaySignatureVerifier, SignatureVerifier,
    StubSignatureVerifier,
};
pub use subscription::{SubscriptionRecord, SubscriptionStatus, SUBSCRIPTION_RECORD_KEY};
pub use usage::{UsageCounter, USAGE_COUNTER_KEY};
pub use validator::{ReceiptValidator, ValidationResult};

pub type Result<T> = anyhow::Result<T>;

#[derive(thiserror::Error, Debug)]
pub enum BillingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
