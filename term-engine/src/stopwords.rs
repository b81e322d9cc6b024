//! Stopword filtering
//!
//! Combines the English list from the `stop-words` crate with a fixed set of
//! words that are noise in Reddit titles and posts.

use std::collections::HashSet;
use stop_words::{get, LANGUAGE};

/// Words that survive the language list but carry no topic on Reddit.
pub const EXTRA_STOPWORDS: &[&str] = &[
    "http", "https", "www", "com", "amp", "nbsp", "gt", "lt", "reddit", "subreddit", "post",
    "thread", "comment", "deleted", "removed", "edit", "update", "link", "imgur", "jpg", "png",
    "gif", "gifv", "like", "just", "get", "got", "one", "would", "could", "should", "also",
    "really", "think", "know", "make", "thing", "way", "lot", "yeah", "lol", "tldr", "dont",
    "didnt", "doesnt", "cant", "wont", "isnt", "arent", "im", "ive", "youre", "thats", "theyre",
    "say", "go", "want", "see", "use", "need", "look", "even", "still", "much", "many",
];

#[derive(Debug, Clone)]
pub struct StopwordFilter {
    stopwords: HashSet<String>,
    extra: HashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::english()
    }
}

impl StopwordFilter {
    /// English language list plus [`EXTRA_STOPWORDS`].
    pub fn english() -> Self {
        let stopwords = get(LANGUAGE::English)
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        Self {
            stopwords,
            extra: EXTRA_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A filter built from explicit lists, mostly for tests.
    pub fn from_lists(stopwords: &[&str], extra: &[&str]) -> Self {
        Self {
            stopwords: stopwords.iter().map(|w| w.to_lowercase()).collect(),
            extra: extra.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn add_extra<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.extra.insert(word.as_ref().trim().to_lowercase());
        }
    }

    /// Membership in the language list. Input is expected lowercase.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Membership in the extra domain list. Input is expected lowercase.
    pub fn is_extra_stopword(&self, word: &str) -> bool {
        self.extra.contains(word)
    }

    pub fn len(&self) -> usize {
        self.stopwords.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty() && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_stopwords() {
        let filter = StopwordFilter::english();
        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("and"));
        assert!(!filter.is_stopword("volcano"));
    }

    #[test]
    fn test_extra_stopwords() {
        let filter = StopwordFilter::english();
        assert!(filter.is_extra_stopword("reddit"));
        assert!(filter.is_extra_stopword("https"));
        assert!(!filter.is_extra_stopword("volcano"));
    }

    #[test]
    fn test_custom_lists() {
        let mut filter = StopwordFilter::from_lists(&["The"], &[]);
        assert!(filter.is_stopword("the"));
        assert!(!filter.is_extra_stopword("motor"));
        filter.add_extra(&["Motor"]);
        assert!(filter.is_extra_stopword("motor"));
        assert_eq!(filter.len(), 2);
    }
}
