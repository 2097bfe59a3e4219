//! Corpus cleaning ahead of vectorization.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::Lemmatizer;

static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").unwrap());
static SHORT_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":[^:\s]+:").unwrap());

/// Default chat filler words excluded from topics.
pub const DEFAULT_FILLER_WORDS: &[&str] = &["join", "late", "channel", "team", "like"];

/// Remove links and `:emoji:` short codes from one message.
pub fn strip_noise(text: &str) -> String {
    let without_urls = URL.replace_all(text, "");
    SHORT_CODE.replace_all(&without_urls, "").into_owned()
}

/// Strip noise from every message, then lemmatize it.
pub fn clean_documents(texts: &[String], lemmatizer: &dyn Lemmatizer) -> Vec<String> {
    texts
        .iter()
        .map(|text| lemmatizer.lemmatize(&strip_noise(text)))
        .collect()
}

/// The lemmatizer's stop words plus the channel name and filler words.
pub fn stop_words(
    lemmatizer: &dyn Lemmatizer,
    channel_name: &str,
    filler_words: &[String],
) -> HashSet<String> {
    let mut stop = lemmatizer.stop_words();
    let _ = stop.insert(channel_name.to_lowercase());
    stop.extend(filler_words.iter().map(|w| w.to_lowercase()));
    stop
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
