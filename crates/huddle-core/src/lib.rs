//! # huddle-core
//!
//! Foundation types shared by every huddle crate:
//!
//! - **Branded IDs**: [`RunId`] (generation correlation id), [`UserId`], [`ChannelId`]
//! - **Messages**: [`Message`] records as fetched from the chat platform, plus
//!   the [`Actor`] who asked for a digest or overview
//! - **Logging**: subscriber setup and in-memory capture for tests

#![deny(unsafe_code)]

pub mod constants;
pub mod ids;
pub mod logging;
pub mod messages;

pub use ids::{ChannelId, RunId, UserId};
pub use messages::{Actor, AuthorKind, Message};
