//! k-means clustering of document rows.
//!
//! Clustering is `linfa-clustering`'s k-means (k-means++ initialisation,
//! Lloyd iterations, fixed internal seed). The cluster count is capped at the
//! number of distinct document rows; surplus topics report no terms.

use std::collections::HashSet;

use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use tracing::debug;

use super::{DEFAULT_TOP_TERMS, terms_at, top_indices};
use crate::error::TopicError;
use crate::vectorize::TermMatrix;

/// Parameters for [`ExtractionMethod::Centroid`](super::ExtractionMethod::Centroid).
#[derive(Clone, Debug, PartialEq)]
pub struct CentroidConfig {
    /// Terms kept per cluster.
    pub top_terms: usize,
    /// Lloyd iteration cap.
    pub max_iterations: u64,
    /// Inertia change below which iteration stops.
    pub tolerance: f64,
    /// Independent initialisations; the lowest-inertia run wins.
    pub n_runs: usize,
}

impl Default for CentroidConfig {
    fn default() -> Self {
        Self {
            top_terms: DEFAULT_TOP_TERMS,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }
}

pub(super) fn extract(
    matrix: &TermMatrix,
    k: usize,
    config: &CentroidConfig,
) -> Result<Vec<Vec<String>>, TopicError> {
    let x = &matrix.weights;
    let mut topics = vec![Vec::new(); k];
    let clusters = k.min(distinct_rows(x));
    if clusters == 0 {
        return Ok(topics);
    }

    let dataset = DatasetBase::from(x.clone());
    let model = KMeans::params(clusters)
        .max_n_iterations(config.max_iterations)
        .tolerance(config.tolerance)
        .n_runs(config.n_runs)
        .fit(&dataset)
        .map_err(|err| TopicError::Numeric(err.to_string()))?;
    let assignment: Array1<usize> = model.predict(x);

    let sizes = cluster_sizes(&assignment, clusters);
    debug!(method = "centroid", k, clusters, ?sizes, "clustering finished");

    let centroids = model.centroids();
    for (c, topic) in topics.iter_mut().take(clusters).enumerate() {
        if sizes[c] > 0 {
            let ranked = top_indices(centroids.row(c).iter().copied(), config.top_terms);
            *topic = terms_at(&matrix.terms, &ranked);
        }
    }
    Ok(topics)
}

/// Number of rows that differ bit for bit.
fn distinct_rows(x: &Array2<f64>) -> usize {
    x.rows()
        .into_iter()
        .map(|row| row.iter().map(|w| w.to_bits()).collect::<Vec<u64>>())
        .collect::<HashSet<_>>()
        .len()
}

fn cluster_sizes(assignment: &Array1<usize>, k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &c in assignment {
        if let Some(size) = sizes.get_mut(c) {
            *size += 1;
        }
    }
    sizes
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
