//! Lemmatization and stop words.
//!
//! [`Lemmatizer`] is the seam for a real morphological analyzer. The built-in
//! [`SuffixLemmatizer`] covers English well enough for topic terms: a table
//! of irregular forms plus Porter-style plural and `-ed`/`-ing` stripping.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Reduces words to a base dictionary form.
pub trait Lemmatizer: Send + Sync {
    /// Lemmatize every word of `text`. Output tokens are space-separated,
    /// with punctuation split off as separate tokens.
    fn lemmatize(&self, text: &str) -> String;

    /// Stop words for the analyzer's language, lowercase.
    fn stop_words(&self) -> HashSet<String>;
}

/// English stop words.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("am", "be"),
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("being", "be"),
        ("has", "have"),
        ("had", "have"),
        ("having", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("doing", "do"),
        ("goes", "go"),
        ("went", "go"),
        ("gone", "go"),
        ("made", "make"),
        ("said", "say"),
        ("ran", "run"),
        ("saw", "see"),
        ("seen", "see"),
        ("got", "get"),
        ("gotten", "get"),
        ("took", "take"),
        ("taken", "take"),
        ("gave", "give"),
        ("given", "give"),
        ("came", "come"),
        ("knew", "know"),
        ("known", "know"),
        ("thought", "think"),
        ("found", "find"),
        ("built", "build"),
        ("wrote", "write"),
        ("written", "write"),
        ("sent", "send"),
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("mice", "mouse"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("news", "news"),
    ]
    .into_iter()
    .collect()
});

/// Rule-based English lemmatizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SuffixLemmatizer;

impl SuffixLemmatizer {
    /// Base form of a single lowercase word.
    ///
    /// Stop words come back unchanged so that stop-word removal after
    /// lemmatization still matches them.
    pub fn lemma(word: &str) -> String {
        if let Some(base) = IRREGULAR.get(word) {
            return (*base).to_string();
        }
        if STOP_WORDS.contains(word)
            || !word.chars().all(|c| c.is_ascii_alphabetic())
            || word.len() <= 3
        {
            return word.to_string();
        }

        let word = strip_plural(word);
        strip_verb_suffix(&word)
    }
}

impl Lemmatizer for SuffixLemmatizer {
    fn lemmatize(&self, text: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut word = String::new();

        for c in text.chars() {
            if c.is_alphanumeric() || c == '_' || (c == '\'' && !word.is_empty()) {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                out.push(Self::lemma(&word.to_lowercase()));
                word.clear();
            }
            if !c.is_whitespace() {
                out.push(c.to_string());
            }
        }
        if !word.is_empty() {
            out.push(Self::lemma(&word.to_lowercase()));
        }
        out.join(" ")
    }

    fn stop_words(&self) -> HashSet<String> {
        ENGLISH_STOP_WORDS.iter().map(|w| (*w).to_string()).collect()
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn strip_plural(word: &str) -> String {
    if let Some(stem) = sibilant_plural_stem(word) {
        return stem.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if stem.len() >= 3 => stem.to_string(),
        _ => word.to_string(),
    }
}

/// Stem of a plural that took `-es` after a sibilant: `classes`, `fixes`,
/// `pushes`, `buzzes`, `branches`, `matches`. `-ches` only counts after `t`,
/// `n` or `r`, so `caches` and `aches` fall through to the plain `-s` rule.
fn sibilant_plural_stem(word: &str) -> Option<&str> {
    let stem = word.strip_suffix("es")?;
    let sibilant = stem.ends_with("ss")
        || stem.ends_with("sh")
        || stem.ends_with("zz")
        || stem.ends_with('x')
        || stem
            .strip_suffix("ch")
            .and_then(|s| s.bytes().last())
            .is_some_and(|b| matches!(b, b't' | b'n' | b'r'));
    (sibilant && stem.len() >= 3).then_some(stem)
}

fn strip_verb_suffix(word: &str) -> String {
    let stem = word
        .strip_suffix("ing")
        .filter(|s| s.len() >= 3)
        .or_else(|| word.strip_suffix("ed").filter(|s| s.len() >= 3));
    let Some(stem) = stem else {
        return word.to_string();
    };
    if !stem.bytes().any(is_vowel) {
        return word.to_string();
    }

    let bytes = stem.as_bytes();
    let n = bytes.len();
    if stem.ends_with("at") || stem.ends_with("bl") || stem.ends_with("iz") {
        return format!("{stem}e");
    }
    if n >= 2 && bytes[n - 1] == bytes[n - 2] && !matches!(bytes[n - 1], b'l' | b's' | b'z') {
        return stem[..n - 1].to_string();
    }
    if n == 3
        && !is_vowel(bytes[0])
        && is_vowel(bytes[1])
        && !is_vowel(bytes[2])
        && !matches!(bytes[2], b'w' | b'x' | b'y')
    {
        return format!("{stem}e");
    }
    stem.to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irregular_forms() {
        assert_eq!(SuffixLemmatizer::lemma("was"), "be");
        assert_eq!(SuffixLemmatizer::lemma("went"), "go");
        assert_eq!(SuffixLemmatizer::lemma("children"), "child");
    }

    #[test]
    fn plurals() {
        assert_eq!(SuffixLemmatizer::lemma("deploys"), "deploy");
        assert_eq!(SuffixLemmatizer::lemma("queries"), "query");
        assert_eq!(SuffixLemmatizer::lemma("classes"), "class");
        assert_eq!(SuffixLemmatizer::lemma("status"), "status");
        assert_eq!(SuffixLemmatizer::lemma("analysis"), "analysis");
    }

    #[test]
    fn sibilant_plurals_drop_es() {
        for (word, lemma) in [
            ("fixes", "fix"),
            ("boxes", "box"),
            ("indexes", "index"),
            ("branches", "branch"),
            ("matches", "match"),
            ("patches", "patch"),
            ("churches", "church"),
            ("pushes", "push"),
            ("crashes", "crash"),
            ("buzzes", "buzz"),
            ("classes", "class"),
        ] {
            assert_eq!(SuffixLemmatizer::lemma(word), lemma, "{word}");
        }
    }

    #[test]
    fn silent_e_plurals_keep_e() {
        for (word, lemma) in [
            ("caches", "cache"),
            ("sizes", "size"),
            ("releases", "release"),
            ("issues", "issue"),
            ("services", "service"),
        ] {
            assert_eq!(SuffixLemmatizer::lemma(word), lemma, "{word}");
        }
    }

    #[test]
    fn stop_words_are_not_stemmed() {
        for word in ["during", "themselves", "yourselves", "having", "doing", "being", "does"] {
            let lemma = SuffixLemmatizer::lemma(word);
            assert!(STOP_WORDS.contains(lemma.as_str()), "{word} -> {lemma}");
        }
        assert_eq!(SuffixLemmatizer::lemma("during"), "during");
        assert_eq!(SuffixLemmatizer::lemma("themselves"), "themselves");
    }

    #[test]
    fn inflections_of_one_verb_share_a_lemma() {
        let out = SuffixLemmatizer.lemmatize("fixes fix fixing fixed branches branch during themselves");
        assert_eq!(out, "fix fix fix fix branch branch during themselves");
    }

    #[test]
    fn verb_suffixes() {
        assert_eq!(SuffixLemmatizer::lemma("running"), "run");
        assert_eq!(SuffixLemmatizer::lemma("deployed"), "deploy");
        assert_eq!(SuffixLemmatizer::lemma("making"), "make");
        assert_eq!(SuffixLemmatizer::lemma("created"), "create");
        assert_eq!(SuffixLemmatizer::lemma("testing"), "test");
        assert_eq!(SuffixLemmatizer::lemma("calling"), "call");
    }

    #[test]
    fn short_and_non_alpha_words_unchanged() {
        assert_eq!(SuffixLemmatizer::lemma("bus"), "bus");
        assert_eq!(SuffixLemmatizer::lemma("k8s"), "k8s");
        assert_eq!(SuffixLemmatizer::lemma("sing"), "sing");
    }

    #[test]
    fn lemmatize_splits_punctuation_and_lowercases() {
        let out = SuffixLemmatizer.lemmatize("Deploys were failing, again!");
        assert_eq!(out, "deploy be fail , again !");
    }

    #[test]
    fn stop_words_cover_english_list() {
        let stop = SuffixLemmatizer.stop_words();
        assert_eq!(stop.len(), ENGLISH_STOP_WORDS.len());
        assert!(stop.contains("the"));
        assert!(stop.contains("wouldn't"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn output_has_no_uppercase_ascii(s in ".{0,80}") {
                let out = SuffixLemmatizer.lemmatize(&s);
                prop_assert!(!out.chars().any(|c| c.is_ascii_uppercase()));
            }

            #[test]
            fn lemma_never_grows_by_more_than_one(word in "[a-z]{1,15}") {
                prop_assert!(SuffixLemmatizer::lemma(&word).len() <= word.len() + 1);
            }
        }
    }
}
