//! # huddle-settings
//!
//! Configuration for huddle, loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`HuddleSettings::default()`]
//! 2. **Settings file**: `~/.huddle/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `CHAT_MODEL`, `OPENAI_API_KEY`, ... (highest priority)
//!
//! Loading never checks that the configuration is usable; call
//! [`HuddleSettings::validate`] before building a service from it.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    load_settings_with, settings_path,
};
pub use types::*;
