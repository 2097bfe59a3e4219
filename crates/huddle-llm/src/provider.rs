//! Completion capability trait and error taxonomy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for completion operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur during a completion call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication failed (missing or invalid key).
    #[error("Auth error: {message}")]
    Auth {
        /// Error description.
        message: String,
    },

    /// Rate limited (or out of quota) at the provider.
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Error description.
        message: String,
    },

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
    },

    /// The call was abandoned before a response was used.
    #[error("Completion cancelled")]
    Cancelled,

    /// Anything else (malformed response, exhausted mock script, ...).
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Error category string for logs and trace entries.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Auth { .. } => "auth",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::Cancelled => "cancelled",
            Self::Other { .. } => "unknown",
        }
    }
}

/// A structured two-part prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Instruction framing the model's role.
    pub system: String,
    /// The task and its payload.
    pub user: String,
}

impl CompletionRequest {
    /// Build a request from its two parts.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Per-call generation options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    /// Model name.
    pub model: String,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f64,
    /// Language the response must be written in.
    pub language: String,
}

impl CompletionOptions {
    /// Same options with `boost` added to the temperature, capped at 2.0.
    #[must_use]
    pub fn with_temperature_boost(&self, boost: f64) -> Self {
        Self {
            temperature: (self.temperature + boost).min(2.0),
            ..self.clone()
        }
    }
}

/// Opaque text generation capability.
///
/// Implementors must be `Send + Sync` so one backend can serve concurrent
/// requests.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Generate a response for `request`.
    ///
    /// Rate-limit and authentication failures must be reported as
    /// [`ProviderError::RateLimited`] and [`ProviderError::Auth`].
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> ProviderResult<String>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let rl = ProviderError::RateLimited {
            message: "slow down".into(),
        };
        assert_eq!(rl.category(), "rate_limit");
        assert_eq!(
            ProviderError::Auth {
                message: "bad key".into()
            }
            .category(),
            "auth"
        );
        assert_eq!(ProviderError::Cancelled.category(), "cancelled");
    }

    #[test]
    fn api_error_display() {
        let err = ProviderError::Api {
            status: 500,
            message: "Internal server error".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "API error (500): Internal server error");
    }

    #[test]
    fn temperature_boost() {
        let opts = CompletionOptions {
            model: "gpt-4.1".into(),
            temperature: 0.2,
            language: "english".into(),
        };
        let boosted = opts.with_temperature_boost(0.1);
        assert!((boosted.temperature - 0.3).abs() < 1e-9);
        assert_eq!(boosted.model, "gpt-4.1");

        let capped = opts.with_temperature_boost(5.0);
        assert!((capped.temperature - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn options_serialize_camel_case() {
        let opts = CompletionOptions {
            model: "m".into(),
            temperature: 0.5,
            language: "english".into(),
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["language"], "english");
    }
}
