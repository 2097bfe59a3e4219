//! The [`Huddle`] service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use huddle_core::{Actor, ChannelId, Message, UserId};
use huddle_digest::{DigestRequest, DigestResult, Summarizer};
use huddle_identity::{IdentityResolver, ProfileDirectory, ResolvedIdentity};
use huddle_llm::{
    Completion, CompletionOptions, Generator, OpenAiConfig, OpenAiProvider, TraceSink,
};
use huddle_settings::{HuddleSettings, LlmSettings, TopicSettings};
use huddle_topics::{Lemmatizer, TopicConfig, TopicEnsemble, TopicOverview};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::HuddleError;
use crate::history::{HistorySource, SincePreset};

/// External capabilities the service is built on.
#[derive(Clone)]
pub struct Collaborators {
    /// User and bot profile lookups.
    pub directory: Arc<dyn ProfileDirectory>,
    /// Text generation backend.
    pub completion: Arc<dyn Completion>,
    /// Receives one trace entry per generation call.
    pub trace_sink: Arc<dyn TraceSink>,
    /// Lemmatizer and stop words for topic analysis.
    pub lemmatizer: Arc<dyn Lemmatizer>,
}

/// Digests, topic overviews and identity lookups over one set of settings.
///
/// The identity cache is owned by the service: two services never share
/// resolved names.
pub struct Huddle {
    settings: HuddleSettings,
    resolver: Arc<IdentityResolver>,
    summarizer: Summarizer,
    topics: TopicEnsemble,
}

impl Huddle {
    /// Build a service over caller-supplied collaborators.
    ///
    /// Settings are validated except for the API key, which only the
    /// built-in OpenAI backend needs.
    pub fn new(settings: HuddleSettings, collaborators: Collaborators) -> Result<Self, HuddleError> {
        settings.validate_tuning()?;

        let options = completion_options(&settings.llm);
        let generator = Generator::new(collaborators.completion, collaborators.trace_sink);
        let resolver = Arc::new(IdentityResolver::new(collaborators.directory));
        let summarizer = Summarizer::new(
            Arc::clone(&resolver),
            generator.clone(),
            options.clone(),
            settings.digest.max_body_tokens,
        );
        let topics = TopicEnsemble::new(
            collaborators.lemmatizer,
            generator,
            options,
            topic_config(&settings.topics),
        );

        info!(
            model = %settings.llm.chat_model,
            max_tokens = settings.digest.max_body_tokens,
            k = settings.topics.num_topics,
            "huddle service ready"
        );
        Ok(Self {
            settings,
            resolver,
            summarizer,
            topics,
        })
    }

    /// Build a service that generates through the OpenAI-compatible
    /// chat-completions API configured in `settings.llm`.
    pub fn with_openai(
        settings: HuddleSettings,
        directory: Arc<dyn ProfileDirectory>,
        trace_sink: Arc<dyn TraceSink>,
        lemmatizer: Arc<dyn Lemmatizer>,
    ) -> Result<Self, HuddleError> {
        settings.validate()?;
        let config = OpenAiConfig::new(settings.llm.api_key.clone())
            .with_base_url(settings.llm.base_url.clone())
            .with_timeout(Duration::from_secs(settings.llm.request_timeout_secs));
        let completion = Arc::new(OpenAiProvider::new(&config)?);
        Self::new(
            settings,
            Collaborators {
                directory,
                completion,
                trace_sink,
                lemmatizer,
            },
        )
    }

    /// Active settings.
    pub fn settings(&self) -> &HuddleSettings {
        &self.settings
    }

    /// Summarize `messages` (newest first) into an ordered digest.
    ///
    /// A rate-limited or unauthenticated backend yields a single apology
    /// line and no run id; other failures are errors.
    pub async fn summarize(
        &self,
        messages: &[Message],
        request: &DigestRequest,
    ) -> Result<DigestResult, HuddleError> {
        self.summarize_until(messages, request, &CancellationToken::new())
            .await
    }

    /// [`summarize`](Self::summarize), stopping when `cancel` fires.
    pub async fn summarize_until(
        &self,
        messages: &[Message],
        request: &DigestRequest,
        cancel: &CancellationToken,
    ) -> Result<DigestResult, HuddleError> {
        Ok(self
            .summarizer
            .summarize_messages(messages, request, cancel)
            .await?)
    }

    /// Fetch a channel's history, optionally bounded by `since`, and
    /// summarize it.
    pub async fn summarize_history(
        &self,
        source: &dyn HistorySource,
        channel: &ChannelId,
        since: Option<SincePreset>,
        now: DateTime<Utc>,
        request: &DigestRequest,
    ) -> Result<DigestResult, HuddleError> {
        let oldest = since.map(|preset| preset.oldest(now));
        let messages = source.fetch(channel, oldest).await.inspect_err(|err| {
            warn!(channel = %channel, error = %err, "history fetch failed");
        })?;
        info!(channel = %channel, messages = messages.len(), since = ?since, "history fetched");
        self.summarize(&messages, request).await
    }

    /// Topic overview of a channel from already-cleaned message texts.
    ///
    /// Returns the narrative and the run id of its synthesis call.
    pub async fn analyze_topics(
        &self,
        channel_name: &str,
        texts: &[String],
        actor: Actor,
        channel_is_private: bool,
    ) -> Result<TopicOverview, HuddleError> {
        self.analyze_topics_until(
            channel_name,
            texts,
            actor,
            channel_is_private,
            &CancellationToken::new(),
        )
        .await
    }

    /// [`analyze_topics`](Self::analyze_topics), stopping when `cancel` fires.
    pub async fn analyze_topics_until(
        &self,
        channel_name: &str,
        texts: &[String],
        actor: Actor,
        channel_is_private: bool,
        cancel: &CancellationToken,
    ) -> Result<TopicOverview, HuddleError> {
        Ok(self
            .topics
            .analyze(channel_name, texts, actor, channel_is_private, cancel)
            .await?)
    }

    /// Display name and affiliation of a sender. Never fails.
    pub async fn resolve_identity(&self, id: &UserId) -> ResolvedIdentity {
        self.resolver.resolve(id).await
    }

    /// Trace metadata for the requester `id`; empty when the lookup fails.
    pub async fn actor_for(&self, id: &UserId) -> Actor {
        self.resolver.actor_for(id).await
    }
}

fn completion_options(llm: &LlmSettings) -> CompletionOptions {
    CompletionOptions {
        model: llm.chat_model.clone(),
        temperature: llm.temperature,
        language: llm.language.clone(),
    }
}

fn topic_config(topics: &TopicSettings) -> TopicConfig {
    TopicConfig {
        num_topics: topics.num_topics,
        max_features: topics.max_features,
        max_df: topics.max_df,
        top_terms: topics.top_terms,
        lda_passes: topics.lda_passes,
        synthesis_temperature_boost: topics.synthesis_temperature_boost,
        filler_words: topics.filler_words.clone(),
        debug_labels: topics.debug_labels,
        ..TopicConfig::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_config_mirrors_settings() {
        let mut settings = TopicSettings::default();
        settings.num_topics = 4;
        settings.debug_labels = true;
        settings.filler_words = vec!["standup".into()];
        let config = topic_config(&settings);
        assert_eq!(config.num_topics, 4);
        assert!(config.debug_labels);
        assert_eq!(config.filler_words, vec!["standup".to_string()]);
        assert_eq!(config.seed, TopicConfig::default().seed);
    }

    #[test]
    fn completion_options_mirror_settings() {
        let llm = LlmSettings {
            chat_model: "gpt-4.1-mini".into(),
            temperature: 0.7,
            language: "french".into(),
            ..LlmSettings::default()
        };
        let options = completion_options(&llm);
        assert_eq!(options.model, "gpt-4.1-mini");
        assert!((options.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(options.language, "french");
    }
}
