//! Per-call trace metadata and sinks.
//!
//! Every generation call carries a fresh [`TraceContext`] and produces
//! exactly one [`TraceEntry`]. Entries from private channels keep their
//! metadata but have prompt and response content blanked by
//! [`PrivacyFilter`], so trace volume does not reveal which channels are
//! private.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use huddle_core::{Actor, RunId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Observability and privacy metadata for one generation call.
///
/// Consumed by [`Generator::generate`](crate::Generator::generate), so a
/// context cannot be reused for a second call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceContext {
    /// Correlation id for this call.
    pub run_id: RunId,
    /// Which feature issued the call (e.g. `"summarize_thread"`).
    pub feature_tag: String,
    /// The requester.
    pub actor: Actor,
    /// Name of the source channel.
    pub channel: String,
    /// Whether the source channel is private.
    pub is_private: bool,
}

impl TraceContext {
    /// Mint a context with a fresh run id.
    pub fn new(
        feature_tag: impl Into<String>,
        actor: Actor,
        channel: impl Into<String>,
        is_private: bool,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            feature_tag: feature_tag.into(),
            actor,
            channel: channel.into(),
            is_private,
        }
    }
}

/// Record of one generation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    /// Call metadata.
    pub context: TraceContext,
    /// Model the call was issued against.
    pub model: String,
    /// System prompt sent.
    pub system_prompt: String,
    /// User prompt sent.
    pub user_prompt: String,
    /// Generated text, if the call succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Error category, if the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the call was issued.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the call.
    pub duration_ms: u64,
}

/// Receiver of trace entries.
pub trait TraceSink: Send + Sync {
    /// Accept one entry. Must not block for long.
    fn record(&self, entry: TraceEntry);
}

/// Blanks prompt and response content of entries from private channels
/// before forwarding them.
#[derive(Clone)]
pub struct PrivacyFilter {
    inner: Arc<dyn TraceSink>,
}

impl PrivacyFilter {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn TraceSink>) -> Self {
        Self { inner }
    }
}

impl TraceSink for PrivacyFilter {
    fn record(&self, mut entry: TraceEntry) {
        if entry.context.is_private {
            entry.system_prompt.clear();
            entry.user_prompt.clear();
            if let Some(response) = entry.response.as_mut() {
                response.clear();
            }
        }
        self.inner.record(entry);
    }
}

/// Emits entries as `info` events on target `huddle::trace`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTraceSink;

impl TraceSink for TracingTraceSink {
    fn record(&self, entry: TraceEntry) {
        let ctx = &entry.context;
        tracing::info!(
            target: "huddle::trace",
            run_id = %ctx.run_id,
            feature = %ctx.feature_tag,
            channel = %ctx.channel,
            is_private = ctx.is_private,
            user_name = ctx.actor.name.as_deref().unwrap_or_default(),
            user_title = ctx.actor.title.as_deref().unwrap_or_default(),
            model = %entry.model,
            duration_ms = entry.duration_ms,
            prompt = %entry.user_prompt,
            response = entry.response.as_deref().unwrap_or_default(),
            error = entry.error.as_deref().unwrap_or_default(),
            "generation traced"
        );
    }
}

/// Keeps entries in memory.
#[derive(Clone, Default)]
pub struct MemoryTraceSink {
    entries: Arc<Mutex<Vec<TraceEntry>>>,
}

impl MemoryTraceSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded entries, oldest first.
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries.lock().clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl TraceSink for MemoryTraceSink {
    fn record(&self, entry: TraceEntry) {
        self.entries.lock().push(entry);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
