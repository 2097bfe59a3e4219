//! # huddle-topics
//!
//! Topic overview of a channel's history.
//!
//! Messages are cleaned ([`preprocess`]), vectorized into a TF-IDF term
//! matrix ([`vectorize`]) and handed to three independent extraction methods
//! ([`ExtractionMethod`]) that run in parallel on the blocking pool. Their
//! term lists are rendered into one block and synthesized into a short
//! narrative by a single generation call ([`TopicEnsemble::analyze`]).

#![deny(unsafe_code)]

pub mod ensemble;
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod preprocess;
pub mod synthesis;
pub mod vectorize;

pub use ensemble::{TOPICS_FEATURE, TopicConfig, TopicEnsemble, TopicOverview};
pub use error::TopicError;
pub use extract::{
    CentroidConfig, Corpus, ExtractionMethod, GenerativeConfig, MethodKind, PhraseModel,
    ProjectionConfig, TopicReport, TopicSet,
};
pub use lexicon::{ENGLISH_STOP_WORDS, Lemmatizer, SuffixLemmatizer};
pub use vectorize::{TermMatrix, VectorizerConfig, vectorize};
