//! Failure classification
//!
//! Ports report failures as [`TransportFailure`]. They are classified exactly
//! once, when a live attempt settles, into the [`ClassifiedError`] that
//! consumers see. Raw failures never reach the consumer-facing state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const SERVICE_UNAVAILABLE: &str = "Service Unavailable";

const UNAUTHORIZED: u16 = 401;

/// A failure as reported by a fetch port.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransportFailure {
    /// HTTP status, if a response was received at all
    pub status: Option<u16>,
    /// Structured response body, if one could be parsed
    pub body: Option<Value>,
    /// The attempt was retired before it settled
    pub cancelled: bool,
}

impl TransportFailure {
    /// A failure caused by the attempt being cancelled.
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Default::default()
        }
    }

    /// A failure with no response at all (connection refused, timeout, ...).
    pub fn network() -> Self {
        Self::default()
    }

    /// A non-success response without a usable body.
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Attach a structured body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The user-presentable form of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    pub message: String,
    pub is_auth_failure: bool,
}

impl ClassifiedError {
    pub fn new(message: impl Into<String>, is_auth_failure: bool) -> Self {
        Self {
            message: message.into(),
            is_auth_failure,
        }
    }

    /// Rejection of a key that can never address a resource.
    pub fn invalid_key(resource: &str, id: i64) -> Self {
        Self::new(format!("Invalid {resource} id: {id}"), false)
    }
}

impl std::fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Classify a port failure.
///
/// Returns `None` for cancelled attempts: those are dropped silently and must
/// not cause a state transition.
pub fn classify(failure: &TransportFailure) -> Option<ClassifiedError> {
    if failure.cancelled {
        return None;
    }

    let message = failure
        .body
        .as_ref()
        .and_then(domain_message)
        .unwrap_or_else(|| match failure.status {
            Some(UNAUTHORIZED) => INVALID_CREDENTIALS.to_string(),
            _ => SERVICE_UNAVAILABLE.to_string(),
        });

    Some(ClassifiedError {
        message,
        is_auth_failure: failure.status == Some(UNAUTHORIZED),
    })
}

/// Extract `message` from a structured body: either a string, or the first
/// element of a list of strings.
fn domain_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => messages.first()?.as_str().map(str::to_string),
        _ => None,
    }
}
