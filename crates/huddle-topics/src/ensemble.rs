//! End-to-end topic overview of a channel.

use std::sync::Arc;

use huddle_core::{Actor, RunId};
use huddle_llm::{CompletionOptions, Generator, ProviderError, TraceContext};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::TopicError;
use crate::extract::{
    CentroidConfig, Corpus, DEFAULT_SEED, ExtractionMethod, GenerativeConfig, ProjectionConfig,
    TopicReport,
};
use crate::lexicon::Lemmatizer;
use crate::preprocess::{DEFAULT_FILLER_WORDS, clean_documents, stop_words};
use crate::synthesis::{post_process, render_block, synthesis_request};
use crate::vectorize::{VectorizerConfig, vectorize};

/// Feature tag recorded on synthesis trace entries.
pub const TOPICS_FEATURE: &str = "analyze_topics";

/// Tunables for a topic overview.
#[derive(Clone, Debug, PartialEq)]
pub struct TopicConfig {
    /// Topics per method.
    pub num_topics: usize,
    /// Vocabulary cap for the term matrix.
    pub max_features: usize,
    /// Document-frequency ceiling for the term matrix.
    pub max_df: f64,
    /// Terms kept per topic.
    pub top_terms: usize,
    /// Sampler sweeps for the generative method.
    pub lda_passes: usize,
    /// Added to the configured temperature for the synthesis call.
    pub synthesis_temperature_boost: f64,
    /// Chat filler words excluded alongside stop words.
    pub filler_words: Vec<String>,
    /// Render method headings in the synthesis block.
    pub debug_labels: bool,
    /// Seed for the generative sampler.
    pub seed: u64,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            num_topics: 6,
            max_features: 5000,
            max_df: 0.85,
            top_terms: 5,
            lda_passes: 20,
            synthesis_temperature_boost: 0.1,
            filler_words: DEFAULT_FILLER_WORDS.iter().map(|w| (*w).to_string()).collect(),
            debug_labels: false,
            seed: DEFAULT_SEED,
        }
    }
}

impl TopicConfig {
    /// The three extraction methods configured from these settings.
    pub fn methods(&self) -> [ExtractionMethod; 3] {
        [
            ExtractionMethod::Centroid(CentroidConfig {
                top_terms: self.top_terms,
                ..CentroidConfig::default()
            }),
            ExtractionMethod::Projection(ProjectionConfig {
                top_terms: self.top_terms,
                ..ProjectionConfig::default()
            }),
            ExtractionMethod::Generative(GenerativeConfig {
                top_terms: self.top_terms,
                passes: self.lda_passes,
                seed: self.seed,
                ..GenerativeConfig::default()
            }),
        ]
    }

    fn vectorizer(&self) -> VectorizerConfig {
        VectorizerConfig {
            max_df: self.max_df,
            max_features: self.max_features,
        }
    }
}

/// Narrative overview of a channel plus the topics behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicOverview {
    /// Post-processed synthesis text.
    pub narrative: String,
    /// Run id of the synthesis call.
    pub run_id: RunId,
    /// Raw per-method topics.
    pub report: TopicReport,
}

/// Runs preprocessing, the three extraction methods and synthesis.
pub struct TopicEnsemble {
    lemmatizer: Arc<dyn Lemmatizer>,
    generator: Generator,
    options: CompletionOptions,
    config: TopicConfig,
}

impl TopicEnsemble {
    /// Create an ensemble. `options` carries the base temperature; the
    /// synthesis call adds the configured boost.
    pub fn new(
        lemmatizer: Arc<dyn Lemmatizer>,
        generator: Generator,
        options: CompletionOptions,
        config: TopicConfig,
    ) -> Self {
        Self {
            lemmatizer,
            generator,
            options,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &TopicConfig {
        &self.config
    }

    /// Clean `texts` and build the term matrix.
    pub fn build_corpus(&self, channel_name: &str, texts: &[String]) -> Result<Corpus, TopicError> {
        corpus_from(self.lemmatizer.as_ref(), &self.config, channel_name, texts)
    }

    /// Extract topics with every method, each on the blocking pool.
    pub async fn extract(&self, channel_name: &str, texts: &[String]) -> Result<TopicReport, TopicError> {
        let lemmatizer = Arc::clone(&self.lemmatizer);
        let config = self.config.clone();
        let channel = channel_name.to_string();
        let texts = texts.to_vec();
        let corpus = tokio::task::spawn_blocking(move || {
            corpus_from(lemmatizer.as_ref(), &config, &channel, &texts)
        })
        .await??;
        let corpus = Arc::new(corpus);
        let k = self.config.num_topics;

        let handles: Vec<_> = self
            .config
            .methods()
            .into_iter()
            .map(|method| {
                let corpus = Arc::clone(&corpus);
                tokio::task::spawn_blocking(move || {
                    debug!(method = method.kind().name(), k, "extracting topics");
                    method.extract(&corpus, k)
                })
            })
            .collect();

        let mut report = TopicReport::new();
        for handle in handles {
            let set = handle.await??;
            let _ = report.insert(set.method, set);
        }
        Ok(report)
    }

    /// Extract topics from `texts` and synthesize them into a narrative.
    ///
    /// Extraction failures propagate as-is. The synthesis call runs at the
    /// configured temperature plus the boost and is traced under
    /// [`TOPICS_FEATURE`]. A token cancelled before synthesis starts yields
    /// [`ProviderError::Cancelled`] with no call issued and nothing traced.
    pub async fn analyze(
        &self,
        channel_name: &str,
        texts: &[String],
        actor: Actor,
        is_private: bool,
        cancel: &CancellationToken,
    ) -> Result<TopicOverview, TopicError> {
        info!(channel = channel_name, documents = texts.len(), k = self.config.num_topics, "analyzing topics");
        ensure_live(channel_name, cancel)?;
        let report = self.extract(channel_name, texts).await?;
        ensure_live(channel_name, cancel)?;
        let block = render_block(channel_name, &report, self.config.debug_labels);

        let options = self
            .options
            .with_temperature_boost(self.config.synthesis_temperature_boost);
        let context = TraceContext::new(TOPICS_FEATURE, actor, channel_name, is_private);
        let request = synthesis_request(channel_name, &block, &options.language);
        let generation = self
            .generator
            .generate(request, &options, context, cancel)
            .await?;

        info!(run_id = %generation.run_id, channel = channel_name, "topic overview synthesized");
        Ok(TopicOverview {
            narrative: post_process(channel_name, &generation.text),
            run_id: generation.run_id,
            report,
        })
    }
}

fn ensure_live(channel_name: &str, cancel: &CancellationToken) -> Result<(), TopicError> {
    if cancel.is_cancelled() {
        info!(channel = channel_name, "topic analysis cancelled");
        return Err(ProviderError::Cancelled.into());
    }
    Ok(())
}

fn corpus_from(
    lemmatizer: &dyn Lemmatizer,
    config: &TopicConfig,
    channel_name: &str,
    texts: &[String],
) -> Result<Corpus, TopicError> {
    let documents = clean_documents(texts, lemmatizer);
    let stop_words = stop_words(lemmatizer, channel_name, &config.filler_words);
    let matrix = vectorize(&documents, &stop_words, &config.vectorizer())?;
    debug!(documents = documents.len(), terms = matrix.terms.len(), "corpus built");
    Ok(Corpus {
        documents,
        stop_words,
        matrix,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
