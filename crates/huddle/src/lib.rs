//! # huddle
//!
//! Service facade over the digest, topic and identity crates.
//!
//! A [`Huddle`] is built once from [`HuddleSettings`] and a set of
//! [`Collaborators`] (profile directory, generation backend, trace sink,
//! lemmatizer) and then serves any number of concurrent requests:
//!
//! - [`Huddle::summarize`] turns a conversation into an ordered digest,
//! - [`Huddle::analyze_topics`] produces a topic overview of channel history,
//! - [`Huddle::resolve_identity`] names a sender through the owned cache.
//!
//! Chat-platform access stays behind [`HistorySource`].

#![deny(unsafe_code)]

pub mod error;
pub mod history;
pub mod service;

pub use error::HuddleError;
pub use history::{HistoryError, HistorySource, InMemoryHistory, SincePreset, UnknownPreset};
pub use service::{Collaborators, Huddle};

pub use huddle_core::{Actor, AuthorKind, ChannelId, Message, RunId, UserId};
pub use huddle_digest::{AUTH_APOLOGY, DigestRequest, DigestResult, RATE_LIMIT_APOLOGY};
pub use huddle_identity::ResolvedIdentity;
pub use huddle_settings::HuddleSettings;
pub use huddle_topics::TopicOverview;

/// Install the global tracing subscriber at the configured level.
///
/// `RUST_LOG` overrides the level when set.
pub fn init_logging(settings: &HuddleSettings) {
    huddle_core::logging::init_subscriber(&settings.logging.level);
}
