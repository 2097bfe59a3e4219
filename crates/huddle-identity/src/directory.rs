//! Profile lookup boundary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use huddle_core::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a profile lookup did not produce a profile.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The platform has no profile of this kind for the id.
    #[error("profile not found")]
    NotFound,
    /// Network failure, platform error, or unexpected response.
    #[error("lookup failed: {0}")]
    Transient(String),
}

/// A human member's profile, as much of it as the platform returned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Handle.
    pub name: Option<String>,
    /// Top-level full name.
    pub real_name: Option<String>,
    /// Full name from the nested profile record.
    pub profile_real_name: Option<String>,
    /// Job title.
    pub title: Option<String>,
    /// Guest/restricted flag. Absent means the platform did not say.
    pub is_restricted: Option<bool>,
}

impl UserProfile {
    /// Preferred display name: top-level real name, then the nested one.
    pub fn display_name(&self) -> Option<&str> {
        self.real_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.profile_real_name.as_deref().filter(|n| !n.is_empty()))
    }

    /// Whether this user belongs to the workspace. A missing restriction
    /// flag counts as restricted.
    pub fn is_internal(&self) -> bool {
        !self.is_restricted.unwrap_or(true)
    }
}

/// A bot or app integration's profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotProfile {
    /// Bot name.
    pub name: String,
}

/// Platform directory of user and bot profiles.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Look up a human member.
    async fn user_profile(&self, id: &UserId) -> Result<UserProfile, LookupError>;

    /// Look up a bot integration.
    async fn bot_profile(&self, id: &UserId) -> Result<BotProfile, LookupError>;
}

/// Fixed in-memory directory that counts lookups.
///
/// Ids without an entry report [`LookupError::NotFound`].
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: HashMap<UserId, Result<UserProfile, LookupError>>,
    bots: HashMap<UserId, Result<BotProfile, LookupError>>,
    user_lookups: AtomicUsize,
    bot_lookups: AtomicUsize,
}

impl InMemoryDirectory {
    /// Empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user profile.
    #[must_use]
    pub fn with_user(mut self, id: impl Into<UserId>, profile: UserProfile) -> Self {
        let _ = self.users.insert(id.into(), Ok(profile));
        self
    }

    /// Make user lookups for `id` fail with `error`.
    #[must_use]
    pub fn with_user_error(mut self, id: impl Into<UserId>, error: LookupError) -> Self {
        let _ = self.users.insert(id.into(), Err(error));
        self
    }

    /// Add a bot profile.
    #[must_use]
    pub fn with_bot(mut self, id: impl Into<UserId>, name: impl Into<String>) -> Self {
        let _ = self
            .bots
            .insert(id.into(), Ok(BotProfile { name: name.into() }));
        self
    }

    /// Make bot lookups for `id` fail with `error`.
    #[must_use]
    pub fn with_bot_error(mut self, id: impl Into<UserId>, error: LookupError) -> Self {
        let _ = self.bots.insert(id.into(), Err(error));
        self
    }

    /// User lookups served so far.
    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    /// Bot lookups served so far.
    pub fn bot_lookups(&self) -> usize {
        self.bot_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryDirectory {
    async fn user_profile(&self, id: &UserId) -> Result<UserProfile, LookupError> {
        let _ = self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.users.get(id).cloned().unwrap_or(Err(LookupError::NotFound))
    }

    async fn bot_profile(&self, id: &UserId) -> Result<BotProfile, LookupError> {
        let _ = self.bot_lookups.fetch_add(1, Ordering::SeqCst);
        self.bots.get(id).cloned().unwrap_or(Err(LookupError::NotFound))
    }
}
