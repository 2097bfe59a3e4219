//! API error response parsing.
//!
//! Handles the error envelopes OpenAI-compatible servers return:
//! - Standard: `{"error": {"message": "...", "type": "...", "code": "..."}}`
//! - Detail:   `{"detail": "..."}`
//! - Flat:     `{"message": "...", "code": "..."}`

use serde_json::Value;

use crate::provider::ProviderError;

/// Parsed API error information.
#[derive(Debug)]
pub struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Provider-specific error code (e.g., `"insufficient_quota"`).
    pub code: Option<String>,
}

/// Parse an API error response body into structured error info.
///
/// Falls back to the raw body text if no known envelope matches.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            let code = json["error"]["code"]
                .as_str()
                .or_else(|| json["error"]["type"].as_str())
                .map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
            };
        }

        if let Some(msg) = json["detail"].as_str().or_else(|| json["message"].as_str()) {
            let code = json["code"]
                .as_str()
                .or_else(|| json["type"].as_str())
                .map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
            };
        }
    }

    ApiErrorInfo {
        message: format!("HTTP {status}: {body}"),
        code: None,
    }
}

/// Classify a non-success HTTP response into a [`ProviderError`].
///
/// 429 is a rate limit (including quota exhaustion), 401 and 403 are
/// authentication failures, everything else is a generic API error.
pub fn classify_status(status: u16, body: &str) -> ProviderError {
    let info = parse_api_error(body, status);
    match status {
        429 => ProviderError::RateLimited {
            message: info.message,
        },
        401 | 403 => ProviderError::Auth {
            message: info.message,
        },
        _ => ProviderError::Api {
            status,
            message: info.message,
            code: info.code,
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
