//! Bounded, persisted history of classified purchase errors.

use std::sync::Arc;

use promptkit_lib::KeyValueStorage;

use crate::PurchaseError;

/// Storage key for the serialized error history.
pub const ERROR_HISTORY_KEY: &str = "purchase-error-history";

/// Most recent classified errors, newest last.
///
/// Capacity-bounded: appending beyond the bound evicts the oldest entries.
/// Persistence failures are logged and swallowed; error reporting must not
/// itself become a source of errors.
pub struct ErrorHistory {
    storage: Arc<dyn KeyValueStorage>,
    capacity: usize,
}

impl ErrorHistory {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    pub fn with_capacity(storage: Arc<dyn KeyValueStorage>, capacity: usize) -> Self {
        Self { storage, capacity }
    }

    /// Append an error, evicting the oldest entries past capacity.
    pub async fn append(&self, error: &PurchaseError) {
        let mut entries = self.load().await;
        entries.push(error.clone());
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        self.persist(&entries).await;
    }

    /// The `count` most recent errors, newest last.
    pub async fn recent(&self, count: usize) -> Vec<PurchaseError> {
        let entries = self.load().await;
        let skip = entries.len().saturating_sub(count);
        entries.into_iter().skip(skip).collect()
    }

    /// All retained errors, newest last.
    pub async fn all(&self) -> Vec<PurchaseError> {
        self.load().await
    }

    pub async fn len(&self) -> usize {
        self.load().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.load().await.is_empty()
    }

    /// Drop the persisted history.
    pub async fn clear(&self) {
        if let Err(e) = self.storage.remove(ERROR_HISTORY_KEY).await {
            tracing::warn!("Failed to clear error history: {}", e);
        }
    }

    async fn load(&self) -> Vec<PurchaseError> {
        match self.storage.get(ERROR_HISTORY_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Corrupt error history, starting fresh: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load error history: {}", e);
                Vec::new()
            }
        }
    }

    async fn persist(&self, entries: &[PurchaseError]) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize error history: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(ERROR_HISTORY_KEY, &raw).await {
            tracing::warn!("Failed to persist error history: {}", e);
        }
    }
}
