//! LDA topic model over phrase-merged token sequences.
//!
//! Documents are stripped of punctuation and split on whitespace; stop words
//! and short tokens are dropped. Frequent adjacent pairs are merged into
//! compound tokens twice over (pairs, then triples), tokens that are too
//! rare or too common across documents are removed, and the remainder is fit
//! with collapsed Gibbs sampling.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::{DEFAULT_SEED, DEFAULT_TOP_TERMS};

/// Parameters for [`ExtractionMethod::Generative`](super::ExtractionMethod::Generative).
#[derive(Clone, Debug, PartialEq)]
pub struct GenerativeConfig {
    /// Terms kept per topic.
    pub top_terms: usize,
    /// Gibbs sweeps over the corpus.
    pub passes: usize,
    /// Tokens must have more characters than this.
    pub min_token_chars: usize,
    /// Pair count subtracted when scoring a phrase.
    pub phrase_min_count: usize,
    /// Score a pair must exceed to become a phrase.
    pub phrase_threshold: f64,
    /// Tokens must appear in at least this many documents.
    pub no_below: usize,
    /// Tokens must appear in at most this fraction of documents.
    pub no_above: f64,
    /// Sampler seed.
    pub seed: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            top_terms: DEFAULT_TOP_TERMS,
            passes: 20,
            min_token_chars: 3,
            phrase_min_count: 5,
            phrase_threshold: 100.0,
            no_below: 2,
            no_above: 0.9,
            seed: DEFAULT_SEED,
        }
    }
}

/// Learned adjacent-pair statistics.
#[derive(Clone, Debug, Default)]
pub struct PhraseModel {
    unigrams: HashMap<String, usize>,
    pairs: HashMap<(String, String), usize>,
    min_count: usize,
    threshold: f64,
}

impl PhraseModel {
    /// Count tokens and adjacent pairs across `documents`.
    pub fn learn(documents: &[Vec<String>], min_count: usize, threshold: f64) -> Self {
        let mut model = Self {
            min_count,
            threshold,
            ..Self::default()
        };
        for doc in documents {
            for token in doc {
                *model.unigrams.entry(token.clone()).or_insert(0) += 1;
            }
            for pair in doc.windows(2) {
                *model
                    .pairs
                    .entry((pair[0].clone(), pair[1].clone()))
                    .or_insert(0) += 1;
            }
        }
        model
    }

    /// `(count(ab) - min_count) * |V| / (count(a) * count(b))`, where `|V|`
    /// counts distinct tokens and pairs.
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        let count_a = *self.unigrams.get(a)?;
        let count_b = *self.unigrams.get(b)?;
        let count_ab = *self.pairs.get(&(a.to_string(), b.to_string()))?;
        let vocab = (self.unigrams.len() + self.pairs.len()) as f64;
        Some((count_ab as f64 - self.min_count as f64) * vocab / (count_a * count_b) as f64)
    }

    /// Merge qualifying pairs left to right, joining with `_`.
    pub fn apply(&self, doc: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(doc.len());
        let mut i = 0;
        while i < doc.len() {
            if i + 1 < doc.len()
                && self
                    .score(&doc[i], &doc[i + 1])
                    .is_some_and(|s| s > self.threshold)
            {
                out.push(format!("{}_{}", doc[i], doc[i + 1]));
                i += 2;
            } else {
                out.push(doc[i].clone());
                i += 1;
            }
        }
        out
    }
}

/// Punctuation-free tokens longer than `min_chars`, minus stop words.
pub(crate) fn tokens(document: &str, stop_words: &HashSet<String>, min_chars: usize) -> Vec<String> {
    let stripped: String = document.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    stripped
        .split_whitespace()
        .filter(|w| !stop_words.contains(*w) && w.chars().count() > min_chars)
        .map(str::to_string)
        .collect()
}

/// Sorted tokens present in at least `no_below` documents and at most
/// `no_above` of them.
fn dictionary(documents: &[Vec<String>], no_below: usize, no_above: f64) -> Vec<String> {
    let mut df: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in documents {
        let unique: BTreeSet<&str> = doc.iter().map(String::as_str).collect();
        for token in unique {
            *df.entry(token).or_insert(0) += 1;
        }
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_docs = (no_above * documents.len() as f64) as usize;
    df.into_iter()
        .filter(|(_, count)| *count >= no_below && *count <= max_docs)
        .map(|(token, _)| token.to_string())
        .collect()
}

pub(super) fn extract(
    documents: &[String],
    stop_words: &HashSet<String>,
    k: usize,
    config: &GenerativeConfig,
) -> Vec<Vec<String>> {
    if k == 0 {
        return Vec::new();
    }

    let raw: Vec<Vec<String>> = documents
        .iter()
        .map(|d| tokens(d, stop_words, config.min_token_chars))
        .collect();
    let pairs = PhraseModel::learn(&raw, config.phrase_min_count, config.phrase_threshold);
    let paired: Vec<Vec<String>> = raw.iter().map(|d| pairs.apply(d)).collect();
    let triples = PhraseModel::learn(&paired, config.phrase_min_count, config.phrase_threshold);
    let merged: Vec<Vec<String>> = paired.iter().map(|d| triples.apply(d)).collect();

    let vocab = dictionary(&merged, config.no_below, config.no_above);
    if vocab.is_empty() {
        warn!(method = "generative", k, "no tokens survive filtering, reporting empty topics");
        return vec![Vec::new(); k];
    }
    let ids: HashMap<&str, usize> = vocab.iter().enumerate().map(|(i, t)| (t.as_str(), i)).collect();
    let corpus: Vec<Vec<usize>> = merged
        .iter()
        .map(|d| d.iter().filter_map(|t| ids.get(t.as_str()).copied()).collect())
        .collect();

    let model = GibbsLda::fit(&corpus, vocab.len(), k, config.passes, config.seed);
    debug!(method = "generative", k, vocab = vocab.len(), passes = config.passes, "topic model fit");

    (0..k)
        .map(|topic| {
            model
                .top_words(topic, config.top_terms)
                .into_iter()
                .map(|w| vocab[w].clone())
                .collect()
        })
        .collect()
}

/// Collapsed Gibbs sampler with symmetric priors `α = η = 1/K`.
struct GibbsLda {
    topic_word: Vec<Vec<usize>>,
    topic_totals: Vec<usize>,
    eta: f64,
    vocab_len: usize,
}

impl GibbsLda {
    fn fit(corpus: &[Vec<usize>], vocab_len: usize, k: usize, passes: usize, seed: u64) -> Self {
        let prior = 1.0 / k as f64;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut doc_topic = vec![vec![0usize; k]; corpus.len()];
        let mut topic_word = vec![vec![0usize; vocab_len]; k];
        let mut topic_totals = vec![0usize; k];

        let mut assignments: Vec<Vec<usize>> = corpus
            .iter()
            .enumerate()
            .map(|(d, doc)| {
                doc.iter()
                    .map(|&w| {
                        let z = rng.random_range(0..k);
                        doc_topic[d][z] += 1;
                        topic_word[z][w] += 1;
                        topic_totals[z] += 1;
                        z
                    })
                    .collect()
            })
            .collect();

        let word_mass = vocab_len as f64 * prior;
        let mut weights = vec![0.0; k];
        for _ in 0..passes {
            for (d, doc) in corpus.iter().enumerate() {
                for (i, &w) in doc.iter().enumerate() {
                    let old = assignments[d][i];
                    doc_topic[d][old] -= 1;
                    topic_word[old][w] -= 1;
                    topic_totals[old] -= 1;

                    let mut total = 0.0;
                    for (z, weight) in weights.iter_mut().enumerate() {
                        *weight = (doc_topic[d][z] as f64 + prior)
                            * (topic_word[z][w] as f64 + prior)
                            / (topic_totals[z] as f64 + word_mass);
                        total += *weight;
                    }
                    let new = sample(&weights, total, &mut rng);

                    assignments[d][i] = new;
                    doc_topic[d][new] += 1;
                    topic_word[new][w] += 1;
                    topic_totals[new] += 1;
                }
            }
        }

        Self {
            topic_word,
            topic_totals,
            eta: prior,
            vocab_len,
        }
    }

    /// Word ids with the highest `p(w | topic)`, ties by id.
    fn top_words(&self, topic: usize, n: usize) -> Vec<usize> {
        let denominator = self.topic_totals[topic] as f64 + self.vocab_len as f64 * self.eta;
        let mut ranked: Vec<(usize, f64)> = self.topic_word[topic]
            .iter()
            .map(|&count| (count as f64 + self.eta) / denominator)
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().take(n).map(|(w, _)| w).collect()
    }
}

fn sample(weights: &[f64], total: f64, rng: &mut StdRng) -> usize {
    let mut target = rng.random::<f64>() * total;
    for (z, weight) in weights.iter().enumerate() {
        if target < *weight {
            return z;
        }
        target -= weight;
    }
    weights.len() - 1
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::sample_documents;

    fn split(docs: &[&str]) -> Vec<Vec<String>> {
        docs.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn tokens_drop_punctuation_stop_words_and_short_words() {
        let stop: HashSet<String> = ["there".to_string()].into();
        assert_eq!(
            tokens("the build's broken, there! ci-pipeline", &stop, 3),
            vec!["builds", "broken", "cipipeline"]
        );
    }

    #[test]
    fn phrase_scoring_follows_formula() {
        let docs = split(&["pull request merged", "pull request open", "code review"]);
        let model = PhraseModel::learn(&docs, 1, 0.0);
        // 6 distinct tokens + 4 distinct pairs, count(pull request) = 2
        let expected = (2.0 - 1.0) * 10.0 / (2.0 * 2.0);
        assert!((model.score("pull", "request").unwrap() - expected).abs() < 1e-12);
        assert!(model.score("request", "pull").is_none());
    }

    #[test]
    fn apply_merges_greedily_left_to_right() {
        let docs = split(&["pull request merged", "pull request open"]);
        let model = PhraseModel::learn(&docs, 0, 1.0);
        let merged = model.apply(&docs[0]);
        assert_eq!(merged, vec!["pull_request", "merged"]);
    }

    #[test]
    fn second_pass_forms_triples() {
        let docs = split(&["pull request review", "pull request review", "pull request review"]);
        let pairs = PhraseModel::learn(&docs, 0, 0.5);
        let paired: Vec<Vec<String>> = docs.iter().map(|d| pairs.apply(d)).collect();
        assert_eq!(paired[0], vec!["pull_request", "review"]);
        let triples = PhraseModel::learn(&paired, 0, 0.5);
        assert_eq!(triples.apply(&paired[0]), vec!["pull_request_review"]);
    }

    #[test]
    fn default_thresholds_leave_small_corpora_unmerged() {
        let docs = split(&["pull request", "pull request"]);
        let model = PhraseModel::learn(&docs, 5, 100.0);
        assert_eq!(model.apply(&docs[0]), docs[0]);
    }

    #[test]
    fn dictionary_filters_by_document_frequency() {
        let docs = split(&["alpha beta", "alpha gamma", "alpha beta", "delta"]);
        // alpha is in 3 of 4 documents; at most 0.5 * 4 = 2 are allowed
        assert_eq!(dictionary(&docs, 2, 0.5), vec!["beta"]);
    }

    #[test]
    fn topics_come_from_the_corpus_vocabulary() {
        let documents = sample_documents();
        let topics = extract(&documents, &HashSet::new(), 3, &GenerativeConfig::default());
        assert_eq!(topics.len(), 3);
        let vocabulary: HashSet<&str> = documents.iter().flat_map(|d| d.split_whitespace()).collect();
        for topic in &topics {
            assert!(!topic.is_empty() && topic.len() <= 5);
            assert!(topic.iter().all(|t| vocabulary.contains(t.as_str())));
        }
    }

    #[test]
    fn unique_words_give_empty_topics() {
        let documents = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let topics = extract(&documents, &HashSet::new(), 4, &GenerativeConfig::default());
        assert_eq!(topics, vec![Vec::<String>::new(); 4]);
    }
}
