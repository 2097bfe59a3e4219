//! Chat message records and requester metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Whether a message was posted by a person or an integration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorKind {
    /// A human workspace member (or guest).
    User,
    /// A bot or app integration.
    Bot,
}

/// A single message as delivered by the history source.
///
/// Messages are immutable once fetched. History arrives newest first and
/// that order is preserved through chunking and summarization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// When the message was posted.
    pub timestamp: DateTime<Utc>,
    /// Sender identifier (user id or bot id, depending on `author_kind`).
    pub author_id: UserId,
    /// Sender classification.
    pub author_kind: AuthorKind,
    /// Raw message text, including platform mention markup.
    pub text: String,
}

impl Message {
    /// Build a user-authored message.
    #[must_use]
    pub fn from_user(
        timestamp: DateTime<Utc>,
        author_id: impl Into<UserId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            author_id: author_id.into(),
            author_kind: AuthorKind::User,
            text: text.into(),
        }
    }

    /// Build a bot-authored message.
    #[must_use]
    pub fn from_bot(
        timestamp: DateTime<Utc>,
        author_id: impl Into<UserId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            author_id: author_id.into(),
            author_kind: AuthorKind::Bot,
            text: text.into(),
        }
    }
}

/// The person who requested a digest or overview.
///
/// Attached to trace metadata. Both fields are optional because the
/// requester's profile may not be resolvable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Handle of the requester.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Job title from the requester's profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Actor {
    /// Actor with a known name and title.
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            title: Some(title.into()),
        }
    }

    /// Whether nothing is known about the actor.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none() && self.title.is_none()
    }
}
