//! Memoized identity resolution.

use std::sync::Arc;

use dashmap::DashMap;
use huddle_core::constants::UNKNOWN_DISPLAY_NAME;
use huddle_core::{Actor, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::directory::{LookupError, ProfileDirectory};

/// A sender id mapped to a display name and workspace affiliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    /// The id that was resolved.
    pub id: UserId,
    /// Name to show in rendered lines.
    pub display_name: String,
    /// Whether the sender belongs to the workspace.
    pub is_internal: bool,
}

impl ResolvedIdentity {
    fn fallback(id: &UserId) -> Self {
        Self {
            id: id.clone(),
            display_name: UNKNOWN_DISPLAY_NAME.to_string(),
            is_internal: true,
        }
    }
}

/// Resolves sender ids through a [`ProfileDirectory`], caching successes.
///
/// The cache lives as long as the resolver and is never invalidated. The
/// fallback identity is not cached, so a later call retries the lookup.
pub struct IdentityResolver {
    directory: Arc<dyn ProfileDirectory>,
    cache: DashMap<UserId, ResolvedIdentity>,
}

impl IdentityResolver {
    /// Create a resolver with an empty cache.
    pub fn new(directory: Arc<dyn ProfileDirectory>) -> Self {
        Self {
            directory,
            cache: DashMap::new(),
        }
    }

    /// Resolve `id`. Never fails.
    ///
    /// Order: cache, user lookup, bot lookup (only when the user lookup says
    /// not found), then the `"Someone"` fallback classified as internal.
    pub async fn resolve(&self, id: &UserId) -> ResolvedIdentity {
        if let Some(hit) = self.cache.get(id) {
            return hit.value().clone();
        }

        match self.directory.user_profile(id).await {
            Ok(profile) => {
                let resolved = ResolvedIdentity {
                    id: id.clone(),
                    display_name: profile
                        .display_name()
                        .unwrap_or(UNKNOWN_DISPLAY_NAME)
                        .to_string(),
                    is_internal: profile.is_internal(),
                };
                return self.remember(resolved);
            }
            Err(LookupError::NotFound) => {
                debug!(identity_id = %id, "no user profile, trying bot directory");
            }
            Err(LookupError::Transient(reason)) => {
                warn!(identity_id = %id, error = %reason, "user lookup failed");
                return ResolvedIdentity::fallback(id);
            }
        }

        match self.directory.bot_profile(id).await {
            Ok(bot) => {
                return self.remember(ResolvedIdentity {
                    id: id.clone(),
                    display_name: bot.name,
                    is_internal: true,
                });
            }
            Err(LookupError::NotFound) => {
                warn!(identity_id = %id, "no user or bot profile");
            }
            Err(LookupError::Transient(reason)) => {
                warn!(identity_id = %id, error = %reason, "bot lookup failed");
            }
        }

        ResolvedIdentity::fallback(id)
    }

    /// Requester metadata for traces: handle and title, or an empty actor
    /// when the profile cannot be fetched. Not cached.
    pub async fn actor_for(&self, id: &UserId) -> Actor {
        match self.directory.user_profile(id).await {
            Ok(profile) => Actor {
                name: profile.name,
                title: profile.title,
            },
            Err(err) => {
                warn!(identity_id = %id, error = %err, "requester lookup failed");
                Actor::default()
            }
        }
    }

    /// Number of cached identities.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn remember(&self, resolved: ResolvedIdentity) -> ResolvedIdentity {
        let _ = self.cache.insert(resolved.id.clone(), resolved.clone());
        resolved
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
