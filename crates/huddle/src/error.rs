//! Facade error type.

use huddle_digest::DigestError;
use huddle_llm::ProviderError;
use huddle_settings::SettingsError;
use huddle_topics::TopicError;

use crate::history::HistoryError;

/// Errors surfaced by [`Huddle`](crate::Huddle).
#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    /// Settings failed to load or validate.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The generation backend could not be constructed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A summarization run failed.
    #[error("Digest error: {0}")]
    Digest(#[from] DigestError),

    /// A topic overview failed.
    #[error("Topic error: {0}")]
    Topics(#[from] TopicError),

    /// Channel history could not be fetched.
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

impl HuddleError {
    /// Error category string for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Settings(_) => "settings",
            Self::Provider(_) => "provider",
            Self::Digest(_) => "digest",
            Self::Topics(_) => "topics",
            Self::History(_) => "history",
        }
    }

    /// Whether the failure came from cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Digest(DigestError::Cancelled)
                | Self::Topics(TopicError::Provider(ProviderError::Cancelled))
                | Self::Provider(ProviderError::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_and_categories() {
        let err: HuddleError = SettingsError::MissingApiKey.into();
        assert_eq!(err.category(), "settings");
        assert_eq!(err.to_string(), "Settings error: OPENAI_API_KEY is not set");

        let err: HuddleError = TopicError::EmptyCorpus.into();
        assert_eq!(err.category(), "topics");
        assert!(!err.is_cancelled());
    }

    #[test]
    fn cancellation_is_recognized_across_layers() {
        assert!(HuddleError::from(DigestError::Cancelled).is_cancelled());
        assert!(HuddleError::from(TopicError::Provider(ProviderError::Cancelled)).is_cancelled());
    }
}
