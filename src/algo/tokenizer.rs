use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("static pattern"));

/// Stop words every weighting model starts from.
pub const BASE_STOP_WORDS: &[&str] = &[
    "i", "a", "me", "my", "we", "you", "he", "she", "it", "they", "am", "is", "are", "was",
    "were", "be", "been", "have", "has", "had", "do", "does", "did", "the", "and", "but", "if",
    "or", "as", "of", "at", "by", "for", "with", "to", "from", "in", "out", "on", "off", "this",
    "that", "what", "which", "who", "when", "where",
];

/// URL and navigation words that carry no topic in a tab title.
pub const DOMAIN_STOP_WORDS: &[&str] = &[
    "com", "org", "net", "io", "dev", "co", "www", "http", "https", "page", "home", "index",
    "view", "site",
];

/// Split text into lowercase letter/digit runs.
///
/// Single-character tokens other than `i` and `a` are dropped, as are purely
/// numeric tokens. Stop words are *not* removed here; see [`StopWords`].
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() > 1 || w == "i" || w == "a")
        .filter(|w| !w.chars().all(char::is_numeric))
        .collect()
}

/// A stop-word set: [`BASE_STOP_WORDS`] plus caller-supplied extras.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: HashSet<String> = BASE_STOP_WORDS.iter().map(|w| (*w).to_string()).collect();
        words.extend(extra.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Tokenize `text` and drop stop words.
    pub fn terms(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|w| !self.contains(w))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}
