//! OpenAI-compatible chat completions client.
//!
//! Sends one non-streaming `POST {base_url}/chat/completions` per call with a
//! system and a user message. No retries: a 429 surfaces immediately as
//! [`ProviderError::RateLimited`] and the caller decides what to do.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error_parsing::classify_status;
use crate::provider::{
    Completion, CompletionOptions, CompletionRequest, ProviderError, ProviderResult,
};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for [`OpenAiProvider`].
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// Bearer token.
    pub api_key: String,
    /// API base URL without trailing `/chat/completions`.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Config for the public endpoint with a 120s timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// [`Completion`] backed by an OpenAI-compatible HTTP API.
#[derive(Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
}

impl OpenAiProvider {
    /// Build a provider. Fails if the key cannot be used as a header value
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &OpenAiConfig) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key);
        let mut auth = HeaderValue::from_str(&auth_value).map_err(|e| ProviderError::Auth {
            message: format!("Invalid authorization header: {e}"),
        })?;
        auth.set_sensitive(true);
        let _ = headers.insert(AUTHORIZATION, auth);
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        info!(endpoint = %endpoint, "completion client initialized");

        Ok(Self {
            client,
            endpoint,
            headers,
        })
    }
}

#[async_trait]
impl Completion for OpenAiProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> ProviderResult<String> {
        let body = ChatRequest {
            model: &options.model,
            temperature: options.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        debug!(model = %options.model, temperature = options.temperature, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body_text));
        }

        let text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Other {
                message: "completion response contained no message content".into(),
            })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options() -> CompletionOptions {
        CompletionOptions {
            model: "gpt-4.1".into(),
            temperature: 0.2,
            language: "english".into(),
        }
    }

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        let config = OpenAiConfig::new("sk-test").with_base_url(format!("{}/v1", server.uri()));
        OpenAiProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4.1",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "- a bullet"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider_for(&server)
            .complete(&CompletionRequest::new("sys", "usr"), &options())
            .await
            .unwrap();
        assert_eq!(text, "- a bullet");
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "3")
                    .set_body_json(serde_json::json!({
                        "error": {"message": "Rate limit reached", "type": "requests"}
                    })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&CompletionRequest::new("s", "u"), &options())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            ProviderError::RateLimited { ref message } if message == "Rate limit reached"
        );
    }

    #[tokio::test]
    async fn status_401_is_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&CompletionRequest::new("s", "u"), &options())
            .await
            .unwrap_err();
        assert_matches!(err, ProviderError::Auth { ref message } if message.contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn status_500_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&CompletionRequest::new("s", "u"), &options())
            .await
            .unwrap_err();
        assert_matches!(err, ProviderError::Api { status: 500, .. });
    }

    #[tokio::test]
    async fn empty_choices_is_other_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&CompletionRequest::new("s", "u"), &options())
            .await
            .unwrap_err();
        assert_matches!(err, ProviderError::Other { .. });
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let config = OpenAiConfig::new("k").with_base_url("http://localhost:1/v1/");
        let provider = OpenAiProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint, "http://localhost:1/v1/chat/completions");
    }

    #[test]
    fn key_with_newline_is_rejected() {
        let config = OpenAiConfig::new("bad\nkey");
        assert_matches!(OpenAiProvider::new(&config), Err(ProviderError::Auth { .. }));
    }
}
