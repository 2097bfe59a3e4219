//! Topic extraction methods.
//!
//! Each method is independent and returns exactly `k` topics with up to
//! `top_terms` terms each. Topic indices are not comparable across methods.

mod centroid;
mod generative;
mod projection;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::TopicError;
use crate::vectorize::TermMatrix;

pub use centroid::CentroidConfig;
pub use generative::{GenerativeConfig, PhraseModel};
pub use projection::ProjectionConfig;

/// Seed shared by the default method configurations.
pub const DEFAULT_SEED: u64 = 42;

/// Terms kept per topic by default.
pub const DEFAULT_TOP_TERMS: usize = 5;

/// Which extraction method produced a topic set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Document clustering.
    Centroid,
    /// Low-rank decomposition of the term matrix.
    Projection,
    /// Probabilistic topic model over token sequences.
    Generative,
}

impl MethodKind {
    /// Stable identifier used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Centroid => "centroid",
            Self::Projection => "projection",
            Self::Generative => "generative",
        }
    }

    /// Heading shown when method labels are enabled.
    pub fn label(self) -> &'static str {
        match self {
            Self::Centroid => "Centroid",
            Self::Projection => "Projection",
            Self::Generative => "Generative",
        }
    }
}

/// Ranked terms per topic for one method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSet {
    /// Producing method.
    pub method: MethodKind,
    /// One ranked term list per topic.
    pub topics: Vec<Vec<String>>,
}

/// Topic sets keyed by method.
pub type TopicReport = BTreeMap<MethodKind, TopicSet>;

/// Cleaned documents and their term matrix.
#[derive(Clone, Debug)]
pub struct Corpus {
    /// Lemmatized documents.
    pub documents: Vec<String>,
    /// Words excluded from every method.
    pub stop_words: HashSet<String>,
    /// TF-IDF weights over `documents`.
    pub matrix: TermMatrix,
}

/// An extraction method together with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtractionMethod {
    /// k-means over document rows.
    Centroid(CentroidConfig),
    /// Truncated decomposition of the term matrix.
    Projection(ProjectionConfig),
    /// LDA over phrase-merged tokens.
    Generative(GenerativeConfig),
}

impl ExtractionMethod {
    /// The three methods with default parameters.
    pub fn defaults() -> [Self; 3] {
        [
            Self::Centroid(CentroidConfig::default()),
            Self::Projection(ProjectionConfig::default()),
            Self::Generative(GenerativeConfig::default()),
        ]
    }

    /// Which method this is.
    pub fn kind(&self) -> MethodKind {
        match self {
            Self::Centroid(_) => MethodKind::Centroid,
            Self::Projection(_) => MethodKind::Projection,
            Self::Generative(_) => MethodKind::Generative,
        }
    }

    /// Extract `k` topics from `corpus`.
    ///
    /// Numerical failures of the clustering or decomposition backends are
    /// returned as [`TopicError::Numeric`].
    pub fn extract(&self, corpus: &Corpus, k: usize) -> Result<TopicSet, TopicError> {
        let topics = match self {
            Self::Centroid(config) => centroid::extract(&corpus.matrix, k, config)?,
            Self::Projection(config) => projection::extract(&corpus.matrix, k, config)?,
            Self::Generative(config) => {
                generative::extract(&corpus.documents, &corpus.stop_words, k, config)
            }
        };
        debug_assert_eq!(topics.len(), k);
        Ok(TopicSet {
            method: self.kind(),
            topics,
        })
    }
}

/// Indices of the `n` largest scores, highest first. Ties keep the lower
/// index first; scores that are not positive are skipped.
pub(crate) fn top_indices(scores: impl IntoIterator<Item = f64>, n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = scores
        .into_iter()
        .enumerate()
        .filter(|(_, s)| *s > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(i, _)| i).collect()
}

pub(crate) fn terms_at(terms: &[String], indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| terms[i].clone()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorize::{VectorizerConfig, vectorize};

    pub(crate) fn sample_documents() -> Vec<String> {
        [
            "deploy pipeline fail build server deploy",
            "build server deploy pipeline broken",
            "pipeline deploy build rollback server",
            "lunch pizza friday order lunch",
            "pizza order lunch friday tacos",
            "friday lunch tacos pizza order",
            "review pull request merge approve",
            "merge request review approve code",
            "code review merge request approve",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
    }

    pub(crate) fn sample_corpus() -> Corpus {
        let documents = sample_documents();
        let stop_words = HashSet::new();
        let matrix = vectorize(&documents, &stop_words, &VectorizerConfig::default()).unwrap();
        Corpus {
            documents,
            stop_words,
            matrix,
        }
    }

    #[test]
    fn top_indices_orders_and_skips_non_positive() {
        assert_eq!(top_indices([0.1, 0.5, 0.0, 0.5, -1.0], 5), vec![1, 3, 0]);
        assert_eq!(top_indices([0.3, 0.2, 0.1], 2), vec![0, 1]);
    }

    #[test]
    fn every_method_returns_k_topics_of_at_most_five_terms() {
        let corpus = sample_corpus();
        for k in [1, 3, 6] {
            for method in ExtractionMethod::defaults() {
                let set = method.extract(&corpus, k).unwrap();
                assert_eq!(set.method, method.kind());
                assert_eq!(set.topics.len(), k, "{} k={k}", method.kind().name());
                assert!(set.topics.iter().all(|t| t.len() <= DEFAULT_TOP_TERMS));
            }
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let corpus = sample_corpus();
        for method in ExtractionMethod::defaults() {
            let first = method.extract(&corpus, 3).unwrap();
            assert_eq!(first, method.extract(&corpus, 3).unwrap());
        }
    }

    #[test]
    fn report_orders_methods() {
        let corpus = sample_corpus();
        let report: TopicReport = ExtractionMethod::defaults()
            .iter()
            .map(|m| (m.kind(), m.extract(&corpus, 2).unwrap()))
            .collect();
        let kinds: Vec<MethodKind> = report.keys().copied().collect();
        assert_eq!(
            kinds,
            vec![MethodKind::Centroid, MethodKind::Projection, MethodKind::Generative]
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn any_k_yields_k_topics(k in 1usize..12, top in 1usize..8) {
                let corpus = sample_corpus();
                let methods = [
                    ExtractionMethod::Centroid(CentroidConfig { top_terms: top, ..CentroidConfig::default() }),
                    ExtractionMethod::Projection(ProjectionConfig { top_terms: top, ..ProjectionConfig::default() }),
                    ExtractionMethod::Generative(GenerativeConfig { top_terms: top, ..GenerativeConfig::default() }),
                ];
                for method in methods {
                    let set = method.extract(&corpus, k).unwrap();
                    prop_assert_eq!(set.topics.len(), k);
                    prop_assert!(set.topics.iter().all(|t| t.len() <= top));
                }
            }
        }
    }
}
