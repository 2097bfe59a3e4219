//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the JSON file
//! format. Every section is `#[serde(default)]`, so a partial file only
//! needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "llm": { "chatModel": "gpt-4.1-mini", "temperature": 0.3 },
///   "digest": { "maxBodyTokens": 1500 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HuddleSettings {
    /// Generation backend settings.
    pub llm: LlmSettings,
    /// Digest (chunked summarization) settings.
    pub digest: DigestSettings,
    /// Topic overview settings.
    pub topics: TopicSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl HuddleSettings {
    /// Check invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        self.validate_tuning()
    }

    /// Like [`validate`](Self::validate), but without requiring an API key.
    /// For callers that supply their own generation backend.
    pub fn validate_tuning(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SettingsError::InvalidValue(format!(
                "temperature {} is outside 0-2",
                self.llm.temperature
            )));
        }
        if self.digest.max_body_tokens == 0 {
            return Err(SettingsError::InvalidValue(
                "maxBodyTokens must be at least 1".into(),
            ));
        }
        if self.topics.num_topics == 0 {
            return Err(SettingsError::InvalidValue(
                "numTopics must be at least 1".into(),
            ));
        }
        if !(self.topics.max_df > 0.0 && self.topics.max_df <= 1.0) {
            return Err(SettingsError::InvalidValue(format!(
                "maxDf {} must be in (0, 1]",
                self.topics.max_df
            )));
        }
        Ok(())
    }
}

/// Generation backend settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    /// Chat model name sent with every request.
    pub chat_model: String,
    /// Sampling temperature for digest calls.
    pub temperature: f64,
    /// Language the model must answer in.
    pub language: String,
    /// Bearer token for the completions endpoint.
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4.1".to_string(),
            temperature: 0.2,
            language: "english".to_string(),
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Digest settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DigestSettings {
    /// Token budget for one chunk of conversation text.
    pub max_body_tokens: usize,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            max_body_tokens: 1000,
        }
    }
}

/// Topic overview settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicSettings {
    /// Topics extracted per method.
    pub num_topics: usize,
    /// Vocabulary cap for the term matrix.
    pub max_features: usize,
    /// Terms present in more than this fraction of documents are dropped.
    pub max_df: f64,
    /// Terms reported per topic.
    pub top_terms: usize,
    /// Sweeps of the generative topic model.
    pub lda_passes: usize,
    /// Added to `llm.temperature` for the synthesis call.
    pub synthesis_temperature_boost: f64,
    /// Generic chat words removed alongside language stop words.
    pub filler_words: Vec<String>,
    /// Render method labels in the synthesis input block.
    pub debug_labels: bool,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            num_topics: 6,
            max_features: 5000,
            max_df: 0.85,
            top_terms: 5,
            lda_passes: 20,
            synthesis_temperature_boost: 0.1,
            filler_words: ["join", "late", "channel", "team", "like"]
                .into_iter()
                .map(String::from)
                .collect(),
            debug_labels: false,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
