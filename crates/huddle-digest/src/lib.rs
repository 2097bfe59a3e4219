//! # huddle-digest
//!
//! Turns a conversation of any length into an ordered bullet digest.
//!
//! Messages are rendered to lines, packed greedily into chunks that fit a
//! token budget ([`chunk`]), and each chunk is summarized by a separate,
//! strictly sequential generation call ([`Summarizer`]). A rate-limit or
//! authentication failure aborts the run with a single apology line; there
//! is no partial digest.

#![deny(unsafe_code)]

pub mod chunker;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod tokens;

pub use chunker::{Chunk, chunk};
pub use error::DigestError;
pub use orchestrator::{
    AUTH_APOLOGY, DigestRequest, DigestResult, RATE_LIMIT_APOLOGY, Summarizer,
};
pub use tokens::estimate;
