use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// The one error the API layer hands back to pages. Transport failures,
/// backend-reported errors and an unhealthy backend all end up as a
/// message; the message is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() { "Unknown error".to_string() } else { message };
        Self { message }
    }

    /// Uses the backend's `error` field when it carries text.
    pub fn from_body(body: &Value, fallback: &str) -> Self {
        match body.get("error").and_then(Value::as_str).map(str::trim) {
            Some(message) if !message.is_empty() => Self::new(message),
            _ => Self::new(fallback),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
