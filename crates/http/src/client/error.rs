//! Client error types

use thiserror::Error;

/// Message used when an error response carries no readable message
pub const GENERIC_FAILURE: &str = "Request failed";

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or transport failure; never retried
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The access token was rejected and could not be refreshed
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// A success body was not the JSON we expected
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An endpoint that always returns a body returned none
    #[error("Server returned an empty response")]
    EmptyResponse,

    /// An OAuth callback URL did not carry a token
    #[error("Invalid sign-in callback: {0}")]
    InvalidCallback(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and message
    pub fn from_status(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        Self::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// HTTP status of an API error
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the caller has to sign in again
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired | Self::Api { status: 401, .. }
        )
    }
}

/// Extract a human-readable message from an error body.
///
/// Understands `{"detail": "..."}`, validation lists of the form
/// `{"detail": [{"msg": "..."}]}` and `{"message": "..."}`.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => {
            return Some(detail.clone());
        }
        Some(serde_json::Value::Array(entries)) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
