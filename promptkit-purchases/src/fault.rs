//! Normalized billing fault representation.
//!
//! Platform billing SDKs report failures in wildly different shapes: thrown
//! strings, objects with `code`/`message` fields, HTTP responses, aborted
//! requests. Everything is normalized into a `BillingFault` before
//! classification, so the classifier itself stays a pure function over one
//! tagged representation.

use serde::{Deserialize, Serialize};

/// One failure reported by a billing layer or API call, normalized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BillingFault {
    /// Human-oriented message, if the source provided one.
    pub message: Option<String>,
    /// Machine code, if the source provided one (store response codes,
    /// `ERR_NETWORK`-style strings, stringified numerics).
    pub code: Option<String>,
    /// HTTP status, when the failure came from an HTTP response.
    pub status: Option<u16>,
    /// Whether the request was aborted/cancelled in flight.
    pub aborted: bool,
}

impl BillingFault {
    /// Fault with only a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Fault with a message and a machine code.
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Fault from an HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            status: Some(status),
            ..Self::default()
        }
    }

    /// Fault from all four components.
    pub fn from_parts(
        message: Option<String>,
        code: Option<String>,
        status: Option<u16>,
        aborted: bool,
    ) -> Self {
        Self {
            message,
            code,
            status,
            aborted,
        }
    }

    /// Fault for an aborted request.
    pub fn aborted() -> Self {
        Self {
            aborted: true,
            ..Self::default()
        }
    }

    /// Normalize a loosely-shaped SDK error payload.
    ///
    /// Accepts the common shapes seen from store SDK bridges: a bare string,
    /// an object with `message`/`code`/`status`/`aborted` fields (string or
    /// numeric codes both occur), or anything else, which normalizes to an
    /// empty fault.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::from_message(s.clone()),
            serde_json::Value::Object(map) => {
                let message = map
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                let code = map.get("code").map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
                let status = map
                    .get("status")
                    .and_then(|v| v.as_u64())
                    .and_then(|s| u16::try_from(s).ok());
                let aborted = map
                    .get("aborted")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false)
                    || map.get("name").and_then(|v| v.as_str()) == Some("AbortError");
                Self {
                    message,
                    code,
                    status,
                    aborted,
                }
            }
            _ => Self::default(),
        }
    }

    /// Lowercased message for predicate matching.
    pub(crate) fn message_lower(&self) -> String {
        self.message.as_deref().unwrap_or("").to_ascii_lowercase()
    }

    /// Lowercased code for predicate matching.
    pub(crate) fn code_lower(&self) -> String {
        self.code.as_deref().unwrap_or("").to_ascii_lowercase()
    }
}

impl From<&str> for BillingFault {
    fn from(message: &str) -> Self {
        Self::from_message(message)
    }
}

impl From<&anyhow::Error> for BillingFault {
    fn from(err: &anyhow::Error) -> Self {
        Self::from_message(err.to_string())
    }
}

impl From<anyhow::Error> for BillingFault {
    fn from(err: anyhow::Error) -> Self {
        Self::from(&err)
    }
}
