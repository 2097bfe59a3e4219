//! Digest error types.

use huddle_llm::ProviderError;
use thiserror::Error;

/// Failures a summarization run reports to its caller.
///
/// Rate-limit and authentication failures are not errors here: they end the
/// run with an apology line in a successful result.
#[derive(Debug, Error)]
pub enum DigestError {
    /// A generation call failed for an unclassified reason.
    #[error("summarization failed: {0}")]
    Provider(#[from] ProviderError),
    /// The run was cancelled before every chunk was summarized.
    #[error("summarization cancelled")]
    Cancelled,
}
