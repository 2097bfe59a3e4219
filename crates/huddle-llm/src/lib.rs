//! # huddle-llm
//!
//! The text generation seam used by digests and topic overviews.
//!
//! - [`Completion`]: the capability trait (system + user prompt in, text out)
//! - [`ProviderError`]: error taxonomy distinguishing rate limiting and auth
//! - [`OpenAiProvider`]: `reqwest` client for OpenAI-compatible chat completions
//! - [`Generator`]: wraps a completion backend so every call gets a fresh
//!   [`TraceContext`] and records exactly one [`TraceEntry`]
//! - [`MockCompletion`]: scripted backend for tests

#![deny(unsafe_code)]

pub mod error_parsing;
pub mod generator;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod trace;

pub use generator::{Generation, Generator};
pub use mock::{MockCompletion, MockResponse};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{
    Completion, CompletionOptions, CompletionRequest, ProviderError, ProviderResult,
};
pub use trace::{
    MemoryTraceSink, PrivacyFilter, TraceContext, TraceEntry, TraceSink, TracingTraceSink,
};
