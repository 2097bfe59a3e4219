//! Topic analysis error types.

use huddle_llm::ProviderError;
use thiserror::Error;

/// Failures of a topic analysis run.
#[derive(Debug, Error)]
pub enum TopicError {
    /// No documents were supplied.
    #[error("no documents to analyze")]
    EmptyCorpus,
    /// Every term was removed by stop words or document-frequency pruning.
    #[error("no terms remain after pruning")]
    EmptyVocabulary,
    /// A clustering or decomposition backend failed.
    #[error("numerical backend failed: {0}")]
    Numeric(String),
    /// The synthesis call failed.
    #[error("topic synthesis failed: {0}")]
    Provider(#[from] ProviderError),
    /// An extraction task panicked or was aborted.
    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(TopicError::EmptyCorpus.to_string(), "no documents to analyze");
        let err: TopicError = ProviderError::Cancelled.into();
        assert!(err.to_string().starts_with("topic synthesis failed"));
        let err = TopicError::Numeric("did not converge".into());
        assert_eq!(err.to_string(), "numerical backend failed: did not converge");
    }
}
