//! Error types for promptkit operations.
//!
//! This module provides structured error types for the promptkit libraries,
//! enabling precise error handling and recovery strategies.

/// Error codes for FFI and mobile integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PromptkitErrorCode {
    /// Resource not found
    NotFound = 4000,
    /// Invalid request/data
    InvalidData = 5000,
    /// Serialization error
    Serialization = 5002,
    /// Storage error
    Storage = 7000,
    /// Quota exceeded
    QuotaExceeded = 7001,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for promptkit operations.
#[derive(Debug, thiserror::Error)]
pub enum PromptkitError {
    /// Resource not found (product, record, key, etc.).
    #[error("{resource_type} not found: {identifier}")]
    NotFound {
        /// Type of resource (e.g., "product", "subscription")
        resource_type: String,
        /// Resource identifier
        identifier: String,
    },

    /// Invalid data provided.
    #[error("invalid {field}: {reason}")]
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Usage quota exceeded.
    #[error("quota exceeded: using {used} of {limit} allowed")]
    QuotaExceeded {
        /// Current usage
        used: u64,
        /// Maximum allowed
        limit: u64,
    },

    /// Internal/unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PromptkitError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> PromptkitErrorCode {
        match self {
            Self::NotFound { .. } => PromptkitErrorCode::NotFound,
            Self::InvalidData { .. } => PromptkitErrorCode::InvalidData,
            Self::Serialization(_) => PromptkitErrorCode::Serialization,
            Self::Storage(_) => PromptkitErrorCode::Storage,
            Self::QuotaExceeded { .. } => PromptkitErrorCode::QuotaExceeded,
            Self::Internal(_) => PromptkitErrorCode::Internal,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if this error is potentially recoverable by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns a suggested retry delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::Storage(_) => Some(500),
            _ => None,
        }
    }

    /// Create a not found error.
    pub fn not_found(resource_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PromptkitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PromptkitError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PromptkitError::Storage("disk full".to_string());
        assert_eq!(err.code(), PromptkitErrorCode::Storage);
        assert!(err.is_retryable());
        assert_eq!(err.retry_after_ms(), Some(500));
    }

    #[test]
    fn test_non_retryable_errors() {
        let err = PromptkitError::invalid_data("purchase_token", "must not be empty");
        assert_eq!(err.code(), PromptkitErrorCode::InvalidData);
        assert!(!err.is_retryable());
        assert_eq!(err.retry_after_ms(), None);
    }

    #[test]
    fn test_error_display() {
        let err = PromptkitError::QuotaExceeded { used: 3, limit: 3 };
        assert!(err.to_string().contains("quota exceeded"));

        let err = PromptkitError::not_found("product", "pro_plan_weekly");
        assert!(err.to_string().contains("pro_plan_weekly"));
    }
}
