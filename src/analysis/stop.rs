//! Stop-word filter.

use ahash::AHashSet;
use parking_lot::RwLock;

use crate::analysis::pipeline::TokenFilter;

/// Built-in English stop words. The empty string is included so that empty
/// pieces produced by the tokenizer are dropped.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "", "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "but", "by", "can", "cannot",
    "could", "dear", "did", "do", "does", "either", "else", "ever", "every", "for", "from", "get",
    "got", "had", "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i", "if",
    "in", "into", "is", "it", "its", "just", "least", "let", "like", "likely", "may", "me",
    "might", "most", "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on",
    "only", "or", "other", "our", "own", "rather", "said", "say", "says", "she", "should",
    "since", "so", "some", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "tis", "to", "too", "twas", "us", "wants", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "yet",
    "you", "your",
];

/// Drops tokens found in a mutable stop-word set.
///
/// The set is shared through the filter handle: changes apply to every
/// pipeline holding the same instance, for documents indexed and queries run
/// afterwards. Already indexed documents are not touched.
#[derive(Debug)]
pub struct StopWordFilter {
    words: RwLock<AHashSet<String>>,
}

impl Default for StopWordFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl StopWordFilter {
    pub const NAME: &'static str = "stopWordFilter";

    /// Filter with the built-in stop words.
    pub fn new() -> Self {
        StopWordFilter {
            words: RwLock::new(default_set()),
        }
    }

    /// Filter with exactly the given words.
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopWordFilter {
            words: RwLock::new(words.into_iter().map(Into::into).collect()),
        }
    }

    /// Restore the built-in set.
    pub fn reset(&self) {
        *self.words.write() = default_set();
    }

    /// Remove every stop word.
    pub fn clear(&self) {
        self.words.write().clear();
    }

    /// Merge additional words into the set.
    pub fn add<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.write().extend(words.into_iter().map(Into::into));
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.read().contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }
}

impl TokenFilter for StopWordFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn filter(&self, token: &str, _index: usize, _tokens: &[String]) -> Option<String> {
        if token.is_empty() || self.contains(token) {
            None
        } else {
            Some(token.to_string())
        }
    }
}

fn default_set() -> AHashSet<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}
