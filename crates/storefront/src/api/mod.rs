//! REST client for the Tavola backend.
//!
//! # Architecture
//!
//! - Plain JSON-over-HTTP via `reqwest`; the backend is the source of truth,
//!   no local sync
//! - One [`ApiClient`] shared by every subsystem, cheap to clone (`Arc` inner)
//! - `Authorization: Bearer <token>` attached when the caller holds a session
//! - Remote failures are normalized to a single human-readable message before
//!   they reach callers

mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP request itself failed (connect, DNS, body transfer).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Remote {
        /// HTTP status code of the response.
        status: u16,
        /// Normalized message extracted from the response body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// The normalized message, suitable for direct display.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Extract a display message from an error response body.
///
/// Precedence: a `detail` / `message` / `error` string field in a JSON body,
/// then the raw (trimmed) body text, then a generic `HTTP <status>` string.
fn normalize_error_body(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["detail", "message", "error"] {
            if let Some(text) = value.get(field).and_then(serde_json::Value::as_str)
                && !text.is_empty()
            {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_detail_field() {
        let message = normalize_error_body(400, r#"{"detail": "Cart is stale"}"#);
        assert_eq!(message, "Cart is stale");
    }

    #[test]
    fn error_body_falls_through_field_precedence() {
        let message = normalize_error_body(400, r#"{"error": "nope", "message": "try again"}"#);
        assert_eq!(message, "try again");
    }

    #[test]
    fn error_body_uses_raw_text_when_not_json() {
        let message = normalize_error_body(502, "upstream exploded\n");
        assert_eq!(message, "upstream exploded");
    }

    #[test]
    fn error_body_generic_when_empty() {
        assert_eq!(normalize_error_body(500, ""), "HTTP 500");
        assert_eq!(normalize_error_body(500, "   "), "HTTP 500");
    }

    #[test]
    fn remote_error_displays_message_only() {
        let err = ApiError::Remote {
            status: 402,
            message: "card issuer declined".to_string(),
        };
        assert_eq!(err.to_string(), "card issuer declined");
    }
}
