//! TF-IDF term matrix.
//!
//! Tokens are lowercase runs of two or more word characters. Terms found in
//! more than `max_df` of the documents are pruned, then the vocabulary is
//! capped at `max_features` by corpus frequency. Columns are in lexicographic
//! term order; IDF is smoothed (`ln((1 + n) / (1 + df)) + 1`) and every
//! non-empty row is L2-normalized.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use ndarray::Array2;
use regex::Regex;

use crate::error::TopicError;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Vectorizer parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorizerConfig {
    /// Maximum document frequency, as a fraction of documents.
    pub max_df: f64,
    /// Vocabulary cap.
    pub max_features: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_df: 0.85,
            max_features: 5000,
        }
    }
}

/// Documents × terms weight matrix.
#[derive(Clone, Debug)]
pub struct TermMatrix {
    /// Column labels, sorted.
    pub terms: Vec<String>,
    /// One row per document.
    pub weights: Array2<f64>,
}

impl TermMatrix {
    /// Number of documents.
    pub fn documents(&self) -> usize {
        self.weights.nrows()
    }
}

/// Split a document into counted terms, skipping stop words.
pub fn tokenize(document: &str, stop_words: &HashSet<String>) -> Vec<String> {
    let lowered = document.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !stop_words.contains(*t))
        .map(str::to_string)
        .collect()
}

/// Build the TF-IDF matrix for `documents`.
///
/// # Errors
///
/// [`TopicError::EmptyCorpus`] when there are no documents and
/// [`TopicError::EmptyVocabulary`] when no term survives pruning.
pub fn vectorize(
    documents: &[String],
    stop_words: &HashSet<String>,
    config: &VectorizerConfig,
) -> Result<TermMatrix, TopicError> {
    if documents.is_empty() {
        return Err(TopicError::EmptyCorpus);
    }
    let n = documents.len();

    let counts: Vec<BTreeMap<String, usize>> = documents
        .iter()
        .map(|doc| {
            let mut row = BTreeMap::new();
            for term in tokenize(doc, stop_words) {
                *row.entry(term).or_insert(0) += 1;
            }
            row
        })
        .collect();

    // term -> (document frequency, corpus frequency)
    let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in &counts {
        for (term, count) in row {
            let entry = stats.entry(term.as_str()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += count;
        }
    }
    if stats.is_empty() {
        return Err(TopicError::EmptyVocabulary);
    }

    let max_doc_count = config.max_df * n as f64;
    let mut kept: Vec<(&str, usize, usize)> = stats
        .into_iter()
        .filter(|(_, (df, _))| *df as f64 <= max_doc_count)
        .map(|(term, (df, tf))| (term, df, tf))
        .collect();
    if kept.is_empty() {
        return Err(TopicError::EmptyVocabulary);
    }

    if kept.len() > config.max_features {
        // Stable sort keeps lexicographic order among equal frequencies.
        kept.sort_by(|a, b| b.2.cmp(&a.2));
        kept.truncate(config.max_features);
        kept.sort_by(|a, b| a.0.cmp(b.0));
    }

    let terms: Vec<String> = kept.iter().map(|(t, _, _)| (*t).to_string()).collect();
    let idf: Vec<f64> = kept
        .iter()
        .map(|(_, df, _)| ((1.0 + n as f64) / (1.0 + *df as f64)).ln() + 1.0)
        .collect();
    let column: BTreeMap<&str, usize> = kept
        .iter()
        .enumerate()
        .map(|(i, (t, _, _))| (*t, i))
        .collect();

    let mut weights = Array2::<f64>::zeros((n, terms.len()));
    for (row_index, row) in counts.iter().enumerate() {
        for (term, count) in row {
            if let Some(&col) = column.get(term.as_str()) {
                weights[[row_index, col]] = *count as f64 * idf[col];
            }
        }
        let mut row_view = weights.row_mut(row_index);
        let norm = row_view.dot(&row_view).sqrt();
        if norm > 0.0 {
            row_view /= norm;
        }
    }

    Ok(TermMatrix { terms, weights })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
