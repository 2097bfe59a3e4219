//! Scripted [`Completion`] backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::provider::{
    Completion, CompletionOptions, CompletionRequest, ProviderError, ProviderResult,
};

/// One scripted outcome.
#[derive(Debug)]
pub enum MockResponse {
    /// Return this text.
    Text(String),
    /// Fail with this error.
    Error(ProviderError),
    /// Never resolve (for cancellation tests).
    Pending,
}

impl MockResponse {
    /// A successful text response.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// A rate-limit failure.
    pub fn rate_limited() -> Self {
        Self::Error(ProviderError::RateLimited {
            message: "Rate limit reached".into(),
        })
    }

    /// An authentication failure.
    pub fn auth_failed() -> Self {
        Self::Error(ProviderError::Auth {
            message: "Incorrect API key provided".into(),
        })
    }
}

/// Returns scripted responses in order and records every request.
///
/// Once the script is exhausted, calls fail with [`ProviderError::Other`].
#[derive(Default)]
pub struct MockCompletion {
    script: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<(CompletionRequest, CompletionOptions)>>,
    calls: AtomicUsize,
}

impl MockCompletion {
    /// Mock with the given script.
    pub fn new(script: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Mock answering each call with the next text.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(MockResponse::text))
    }

    /// Append a response to the script.
    pub fn push(&self, response: MockResponse) {
        self.script.lock().push_back(response);
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in call order.
    pub fn requests(&self) -> Vec<(CompletionRequest, CompletionOptions)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Completion for MockCompletion {
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> ProviderResult<String> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((request.clone(), options.clone()));

        let next = self.script.lock().pop_front();
        match next {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Pending) => std::future::pending().await,
            None => Err(ProviderError::Other {
                message: "mock completion script exhausted".into(),
            }),
        }
    }
}
