//! Sequential chunk summarization with run-level failure handling.

use std::sync::Arc;

use huddle_core::{Actor, Message, RunId};
use huddle_identity::{IdentityResolver, RenderOptions, render_lines};
use huddle_llm::{CompletionOptions, Generator, ProviderError, TraceContext};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::chunker::chunk;
use crate::error::DigestError;
use crate::prompts::chunk_request;

/// Sole entry of a digest aborted by rate limiting.
pub const RATE_LIMIT_APOLOGY: &str = "Sorry, OpenAI rate limit exceeded...";

/// Sole entry of a digest aborted by an authentication failure.
pub const AUTH_APOLOGY: &str = "Sorry, unable to authenticate with OpenAI";

/// Who asked for a digest, and about what.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigestRequest {
    /// Feature tag recorded on every trace entry.
    pub feature_tag: String,
    /// The requester.
    pub actor: Actor,
    /// Source channel name.
    pub channel_name: String,
    /// Whether the source channel is private.
    pub is_private: bool,
    /// Extra instructions appended to every chunk prompt.
    pub custom_instructions: Option<String>,
}

/// Outcome of a summarization run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestResult {
    /// One summary per chunk in chunk order, or a single apology line.
    pub summaries: Vec<String>,
    /// Run id of the last chunk's call; `None` when the run was aborted.
    pub run_id: Option<RunId>,
}

impl DigestResult {
    fn apology(text: &str) -> Self {
        Self {
            summaries: vec![text.to_string()],
            run_id: None,
        }
    }

    /// Whether the run ended in an apology instead of summaries.
    pub fn is_aborted(&self) -> bool {
        self.run_id.is_none()
    }
}

/// Drives chunked summarization of a conversation.
pub struct Summarizer {
    resolver: Arc<IdentityResolver>,
    generator: Generator,
    options: CompletionOptions,
    max_tokens: usize,
}

impl Summarizer {
    /// Create a summarizer with a per-chunk token budget of `max_tokens`.
    pub fn new(
        resolver: Arc<IdentityResolver>,
        generator: Generator,
        options: CompletionOptions,
        max_tokens: usize,
    ) -> Self {
        Self {
            resolver,
            generator,
            options,
            max_tokens,
        }
    }

    /// Render `messages` with resolved names and summarize them.
    pub async fn summarize_messages(
        &self,
        messages: &[Message],
        request: &DigestRequest,
        cancel: &CancellationToken,
    ) -> Result<DigestResult, DigestError> {
        let lines = render_lines(&self.resolver, messages, RenderOptions::default()).await;
        self.summarize_lines(lines, request, cancel).await
    }

    /// Summarize already-rendered lines.
    ///
    /// Chunks are summarized one at a time in order. Rate limiting or an
    /// authentication failure stops the run and yields a single apology
    /// line with no run id. Any other failure is returned as an error.
    /// Cancellation stops before the next call and discards a call in
    /// flight.
    pub async fn summarize_lines(
        &self,
        lines: Vec<String>,
        request: &DigestRequest,
        cancel: &CancellationToken,
    ) -> Result<DigestResult, DigestError> {
        let chunks = chunk(lines, self.max_tokens);
        let total = chunks.len();
        info!(feature = %request.feature_tag, chunks = total, max_tokens = self.max_tokens, "summarizing conversation");

        let mut summaries = Vec::with_capacity(total);
        let mut last_run_id = None;

        for (index, piece) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(feature = %request.feature_tag, chunk = index, "summarization cancelled");
                return Err(DigestError::Cancelled);
            }

            let context = TraceContext::new(
                request.feature_tag.clone(),
                request.actor.clone(),
                request.channel_name.clone(),
                request.is_private,
            );
            let prompt = chunk_request(
                &piece.text(),
                &self.options.language,
                request.custom_instructions.as_deref(),
            );

            match self
                .generator
                .generate(prompt, &self.options, context, cancel)
                .await
            {
                Ok(generation) => {
                    info!(run_id = %generation.run_id, chunk = index, chunks = total, tokens = piece.tokens, "chunk summarized");
                    summaries.push(generation.text);
                    last_run_id = Some(generation.run_id);
                }
                Err(ProviderError::RateLimited { message, .. }) => {
                    error!(chunk = index, error = %message, "rate limited, aborting digest");
                    return Ok(DigestResult::apology(RATE_LIMIT_APOLOGY));
                }
                Err(ProviderError::Auth { message }) => {
                    error!(chunk = index, error = %message, "authentication failed, aborting digest");
                    return Ok(DigestResult::apology(AUTH_APOLOGY));
                }
                Err(ProviderError::Cancelled) => return Err(DigestError::Cancelled),
                Err(other) => return Err(other.into()),
            }
        }

        Ok(DigestResult {
            summaries,
            run_id: last_run_id,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use huddle_identity::{InMemoryDirectory, UserProfile};
    use huddle_llm::{MemoryTraceSink, MockCompletion, MockResponse};

    struct Harness {
        summarizer: Summarizer,
        mock: Arc<MockCompletion>,
        sink: MemoryTraceSink,
    }

    fn harness(script: Vec<MockResponse>, max_tokens: usize) -> Harness {
        let directory = InMemoryDirectory::new().with_user(
            "U1",
            UserProfile {
                real_name: Some("Alice".into()),
                is_restricted: Some(false),
                ..Default::default()
            },
        );
        let resolver = Arc::new(IdentityResolver::new(Arc::new(directory)));
        let mock = Arc::new(MockCompletion::new(script));
        let sink = MemoryTraceSink::new();
        let generator = Generator::new(mock.clone(), Arc::new(sink.clone()));
        let options = CompletionOptions {
            model: "gpt-4.1".into(),
            temperature: 0.2,
            language: "english".into(),
        };
        Harness {
            summarizer: Summarizer::new(resolver, generator, options, max_tokens),
            mock,
            sink,
        }
    }

    fn request(is_private: bool) -> DigestRequest {
        DigestRequest {
            feature_tag: "summarize_thread".into(),
            actor: Actor::new("bob", "PM"),
            channel_name: "general".into(),
            is_private,
            custom_instructions: None,
        }
    }

    // "abcd" costs 2, so a budget of 2 puts each line in its own chunk
    fn three_chunks() -> Vec<String> {
        vec!["abcd".into(), "efgh".into(), "ijkl".into()]
    }

    #[tokio::test]
    async fn summarizes_every_chunk_in_order() {
        let h = harness(
            vec![
                MockResponse::text("- one"),
                MockResponse::text("- two"),
                MockResponse::text("- three"),
            ],
            2,
        );
        let result = h
            .summarizer
            .summarize_lines(three_chunks(), &request(false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.summaries, vec!["- one", "- two", "- three"]);
        let entries = h.sink.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(result.run_id.as_ref(), Some(&entries[2].context.run_id));
        assert_ne!(entries[0].context.run_id, entries[1].context.run_id);

        let requests = h.mock.requests();
        assert!(requests[0].0.user.ends_with("abcd\n"));
        assert!(requests[2].0.user.ends_with("ijkl\n"));
    }

    #[tokio::test]
    async fn rate_limit_on_second_chunk_aborts_run() {
        let h = harness(
            vec![
                MockResponse::text("- one"),
                MockResponse::rate_limited(),
                MockResponse::text("- three"),
            ],
            2,
        );
        let result = h
            .summarizer
            .summarize_lines(three_chunks(), &request(false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.summaries, vec![RATE_LIMIT_APOLOGY.to_string()]);
        assert_eq!(result.run_id, None);
        assert!(result.is_aborted());
        assert_eq!(h.mock.call_count(), 2);
    }

    #[tokio::test]
    async fn auth_failure_aborts_with_distinct_apology() {
        let h = harness(vec![MockResponse::auth_failed()], 2);
        let result = h
            .summarizer
            .summarize_lines(three_chunks(), &request(false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.summaries, vec![AUTH_APOLOGY.to_string()]);
        assert_eq!(result.run_id, None);
        assert_eq!(h.mock.call_count(), 1);
    }

    #[tokio::test]
    async fn other_failures_propagate() {
        let h = harness(
            vec![
                MockResponse::text("- one"),
                MockResponse::Error(ProviderError::Api {
                    status: 500,
                    message: "upstream".into(),
                    code: None,
                }),
            ],
            2,
        );
        let err = h
            .summarizer
            .summarize_lines(three_chunks(), &request(false), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_matches!(err, DigestError::Provider(ProviderError::Api { status: 500, .. }));
        assert_eq!(h.mock.call_count(), 2);
    }

    #[tokio::test]
    async fn cancelled_before_start_issues_no_calls() {
        let h = harness(vec![MockResponse::text("- one")], 2);
        let token = CancellationToken::new();
        token.cancel();

        let err = h
            .summarizer
            .summarize_lines(three_chunks(), &request(false), &token)
            .await
            .unwrap_err();

        assert_matches!(err, DigestError::Cancelled);
        assert_eq!(h.mock.call_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_mid_call_discards_result() {
        let h = harness(vec![MockResponse::text("- one"), MockResponse::Pending], 2);
        let token = CancellationToken::new();
        let canceller = token.clone();
        let handle = tokio::spawn(async move {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            canceller.cancel();
        });

        let err = h
            .summarizer
            .summarize_lines(three_chunks(), &request(false), &token)
            .await
            .unwrap_err();
        handle.await.unwrap();

        assert_matches!(err, DigestError::Cancelled);
        assert_eq!(h.mock.call_count(), 2);
    }

    #[tokio::test]
    async fn private_channel_traces_blank_content() {
        let h = harness(vec![MockResponse::text("- secret")], 1000);
        let _ = h
            .summarizer
            .summarize_lines(vec!["abcd".into()], &request(true), &CancellationToken::new())
            .await
            .unwrap();

        let entries = h.sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_prompt, "");
        assert_eq!(entries[0].response.as_deref(), Some(""));
        assert_eq!(entries[0].context.actor.name.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn empty_conversation_still_issues_one_call() {
        let h = harness(vec![MockResponse::text("- nothing happened")], 10);
        let result = h
            .summarizer
            .summarize_lines(Vec::new(), &request(false), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.summaries.len(), 1);
        assert!(result.run_id.is_some());
        assert_eq!(h.mock.call_count(), 1);
    }

    #[tokio::test]
    async fn messages_are_rendered_before_chunking() {
        let h = harness(vec![MockResponse::text("- greeting")], 1000);
        let msgs = vec![
            Message::from_user(Utc::now(), "U1", "Hi"),
            Message::from_user(Utc::now(), "U1", "How are you?"),
        ];
        let _ = h
            .summarizer
            .summarize_messages(&msgs, &request(false), &CancellationToken::new())
            .await
            .unwrap();

        let user = &h.mock.requests()[0].0.user;
        assert!(user.contains("Alice: Hi\nAlice: How are you?"));
    }

    #[tokio::test]
    async fn custom_instructions_reach_every_chunk() {
        let h = harness(vec![MockResponse::text("a"), MockResponse::text("b")], 2);
        let mut req = request(false);
        req.custom_instructions = Some("List owners.".into());
        let _ = h
            .summarizer
            .summarize_lines(vec!["abcd".into(), "efgh".into()], &req, &CancellationToken::new())
            .await
            .unwrap();

        assert!(h.mock.requests().iter().all(|(r, _)| r.user.contains("List owners.")));
    }
}
