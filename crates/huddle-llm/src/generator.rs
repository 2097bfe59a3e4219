//! Traced, cancellable generation calls.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use huddle_core::RunId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::provider::{Completion, CompletionOptions, CompletionRequest, ProviderError};
use crate::trace::{PrivacyFilter, TraceContext, TraceEntry, TraceSink};

/// Output of a successful call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    /// Generated text.
    pub text: String,
    /// Correlation id of the call that produced it.
    pub run_id: RunId,
}

/// Issues completion calls and records one trace entry per call.
///
/// The sink is always wrapped in a [`PrivacyFilter`].
#[derive(Clone)]
pub struct Generator {
    completion: Arc<dyn Completion>,
    sink: PrivacyFilter,
}

impl Generator {
    /// Create a generator over `completion`, tracing into `sink`.
    pub fn new(completion: Arc<dyn Completion>, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            completion,
            sink: PrivacyFilter::new(sink),
        }
    }

    /// Run one call.
    ///
    /// If `cancel` fires before the backend answers, the in-flight call is
    /// dropped, the entry is recorded with a `cancelled` error and
    /// [`ProviderError::Cancelled`] is returned.
    pub async fn generate(
        &self,
        request: CompletionRequest,
        options: &CompletionOptions,
        context: TraceContext,
        cancel: &CancellationToken,
    ) -> Result<Generation, ProviderError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        debug!(run_id = %context.run_id, feature = %context.feature_tag, model = %options.model, "generation started");

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = self.completion.complete(&request, options) => result,
        };

        let duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (response, error) = match &outcome {
            Ok(text) => (Some(text.clone()), None),
            Err(err) => {
                warn!(run_id = %context.run_id, feature = %context.feature_tag, category = err.category(), error = %err, "generation failed");
                (None, Some(err.category().to_string()))
            }
        };

        let run_id = context.run_id.clone();
        self.sink.record(TraceEntry {
            context,
            model: options.model.clone(),
            system_prompt: request.system,
            user_prompt: request.user,
            response,
            error,
            started_at,
            duration_ms,
        });

        outcome.map(|text| Generation { text, run_id })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
