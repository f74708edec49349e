//! Promptkit foundation library.
//!
//! This crate intentionally stays stateless and delegates persistence to
//! callers through trait-based dependency injection.
//!
//! # Features
//!
//! - **Storage Port**: `KeyValueStorage` trait with in-memory and file-backed
//!   implementations, so domain logic never touches a concrete store
//! - **Catalog Types**: product identifiers, store platforms, and content
//!   difficulty tiers shared by the whole marketplace
//! - **Structured Errors**: error codes with retry metadata for FFI and
//!   mobile integration
//!
//! # Example
//!
//! ```
//! use promptkit_lib::{DifficultyTier, Platform, ProductCatalog, ProductId};
//!
//! let catalog = ProductCatalog::default();
//! assert!(catalog.contains(&ProductId::pro_monthly()));
//!
//! let platform: Platform = "android".parse().unwrap();
//! assert_eq!(platform, Platform::GooglePlay);
//! assert!(DifficultyTier::Beginner.is_free());
//! ```

pub mod catalog;
pub mod errors;
pub mod storage;

pub use catalog::{DifficultyTier, Platform, ProductCatalog, ProductId};
pub use errors::{PromptkitError, PromptkitErrorCode};
pub use storage::{FileKeyValueStorage, KeyValueStorage, MemoryKeyValueStorage};

/// Common result alias for promptkit operations.
pub type Result<T> = std::result::Result<T, PromptkitError>;
