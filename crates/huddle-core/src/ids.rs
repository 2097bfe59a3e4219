//! Branded ID newtypes.
//!
//! Chat-platform identifiers are opaque strings; wrapping them keeps a user
//! id from being passed where a channel id is expected. [`RunId`] is the only
//! id minted locally: every generation call gets a fresh one (UUID v7,
//! time-ordered) so user feedback can be tied back to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Correlation id for one generation call.
    RunId
}

branded_id! {
    /// Opaque chat-platform identifier for a user or bot.
    UserId
}

branded_id! {
    /// Opaque chat-platform identifier for a channel.
    ChannelId
}

impl RunId {
    /// Mint a new run id (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_new_is_uuid_v7() {
        let id = RunId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn run_ids_are_unique() {
        let a = RunId::new();
        let b = RunId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn default_mints_fresh_run_id() {
        assert_ne!(RunId::default(), RunId::default());
    }

    #[test]
    fn user_id_from_str_ref() {
        let id = UserId::from("U123ABC");
        assert_eq!(id.as_str(), "U123ABC");
        assert_eq!(format!("{id}"), "U123ABC");
    }

    #[test]
    fn deref_to_str() {
        let id = ChannelId::from("C42");
        let s: &str = &id;
        assert_eq!(s, "C42");
    }

    #[test]
    fn into_string() {
        let id = UserId::from("B7");
        let s: String = id.into();
        assert_eq!(s, "B7");
    }

    #[test]
    fn serde_is_transparent() {
        let id = RunId::from("run-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"run-1\"");
        let back: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
