//! Truncated decomposition of the term matrix.
//!
//! The components are the top right singular vectors of `X`, computed by
//! `linfa-linalg`'s LOBPCG-based truncated SVD. At most `min(docs, terms)`
//! components exist; the rest of the `k` requested report no terms.

use linfa_linalg::lobpcg::{Order, TruncatedSvd};
use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

use super::{DEFAULT_TOP_TERMS, terms_at};
use crate::error::TopicError;
use crate::vectorize::TermMatrix;

/// Below this, a singular value or loading is treated as zero.
const ZERO_SINGULAR_VALUE: f64 = 1e-10;

/// Parameters for [`ExtractionMethod::Projection`](super::ExtractionMethod::Projection).
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionConfig {
    /// Terms kept per component.
    pub top_terms: usize,
    /// LOBPCG iteration cap.
    pub max_iterations: usize,
    /// LOBPCG residual tolerance.
    pub precision: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            top_terms: DEFAULT_TOP_TERMS,
            max_iterations: 500,
            precision: 1e-7,
        }
    }
}

pub(super) fn extract(
    matrix: &TermMatrix,
    k: usize,
    config: &ProjectionConfig,
) -> Result<Vec<Vec<String>>, TopicError> {
    Ok(components(&matrix.weights, k, config)?
        .iter()
        .map(|component| match component {
            Some(v) => terms_at(&matrix.terms, &top_by_magnitude(v.view(), config.top_terms)),
            None => Vec::new(),
        })
        .collect())
}

/// Leading `k` unit right singular vectors of `x`; `None` where the singular
/// value is numerically zero or the component does not exist.
pub(crate) fn components(
    x: &Array2<f64>,
    k: usize,
    config: &ProjectionConfig,
) -> Result<Vec<Option<Array1<f64>>>, TopicError> {
    let rank_bound = k.min(x.nrows()).min(x.ncols());
    let mut out: Vec<Option<Array1<f64>>> = vec![None; k];
    if rank_bound == 0 {
        return Ok(out);
    }

    let (_, sigma, v_t) = TruncatedSvd::new(x.to_owned(), Order::Largest)
        .precision(config.precision)
        .maxiter(config.max_iterations)
        .decompose(rank_bound)
        .map_err(|err| TopicError::Numeric(err.to_string()))?
        .values_vectors();

    let mut order: Vec<usize> = (0..sigma.len()).collect();
    order.sort_by(|a, b| sigma[*b].total_cmp(&sigma[*a]));

    for (slot, index) in order.into_iter().enumerate() {
        let value = sigma[index];
        if value.is_nan() || value <= ZERO_SINGULAR_VALUE {
            debug!(method = "projection", component = slot, "component is zero");
            continue;
        }
        debug!(method = "projection", component = slot, singular_value = value, "component found");
        out[slot] = Some(v_t.row(index).to_owned());
    }
    Ok(out)
}

/// Indices of the `n` largest absolute loadings, ties by index.
fn top_by_magnitude(v: ArrayView1<'_, f64>, n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = v
        .iter()
        .map(|x| x.abs())
        .enumerate()
        .filter(|(_, m)| *m > ZERO_SINGULAR_VALUE)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(i, _)| i).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::sample_corpus;
    use ndarray::array;

    #[test]
    fn recovers_dominant_direction() {
        // rank one: every row is a multiple of (3, 4, 0)
        let x = array![[3.0, 4.0, 0.0], [6.0, 8.0, 0.0]];
        let comps = components(&x, 2, &ProjectionConfig::default()).unwrap();
        let v = comps[0].as_ref().unwrap();
        assert!((v[0].abs() - 0.6).abs() < 1e-4);
        assert!((v[1].abs() - 0.8).abs() < 1e-4);
        assert!(v[2].abs() < 1e-4);
        assert!(comps[1].is_none());
    }

    #[test]
    fn components_are_orthonormal() {
        let corpus = sample_corpus();
        let comps = components(&corpus.matrix.weights, 3, &ProjectionConfig::default()).unwrap();
        let vs: Vec<&Array1<f64>> = comps.iter().flatten().collect();
        assert_eq!(vs.len(), 3);
        for (i, a) in vs.iter().enumerate() {
            for (j, b) in vs.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((a.dot(*b) - expected).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn ranks_by_magnitude_not_sign() {
        let v = array![0.1, -0.9, 0.5, 0.0];
        assert_eq!(top_by_magnitude(v.view(), 5), vec![1, 2, 0]);
    }

    #[test]
    fn excess_components_report_no_terms() {
        let corpus = sample_corpus();
        let rank_bound = corpus.matrix.documents();
        let topics = extract(&corpus.matrix, rank_bound + 2, &ProjectionConfig::default()).unwrap();
        assert_eq!(topics.len(), rank_bound + 2);
        assert!(topics[rank_bound].is_empty());
        assert!(topics[rank_bound + 1].is_empty());
    }

    #[test]
    fn leading_components_have_terms() {
        let corpus = sample_corpus();
        let topics = extract(&corpus.matrix, 3, &ProjectionConfig::default()).unwrap();
        assert!(topics.iter().all(|t| !t.is_empty()));
    }
}
