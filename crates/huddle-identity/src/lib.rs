//! # huddle-identity
//!
//! Maps opaque sender ids to display names and an internal/external
//! classification, and renders messages into the `"<name>: <text>"` lines the
//! digest and topic pipelines consume.
//!
//! Lookups go through the [`ProfileDirectory`] boundary, implemented by the
//! chat-platform adapter. [`IdentityResolver`] memoizes successful lookups for
//! its own lifetime; it never fails, degrading to `"Someone"` instead.

#![deny(unsafe_code)]

pub mod directory;
pub mod render;
pub mod resolver;

pub use directory::{BotProfile, InMemoryDirectory, LookupError, ProfileDirectory, UserProfile};
pub use render::{RenderOptions, render_lines};
pub use resolver::{IdentityResolver, ResolvedIdentity};
