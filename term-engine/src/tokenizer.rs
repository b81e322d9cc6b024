//! Text to lemma pipeline.
//!
//! URLs are stripped, the text is lowercased and split into word tokens
//! (contractions split into base and suffix), each token is lemmatized, and
//! only alphabetic lemmas longer than two characters that are not stopwords
//! are kept.

use regex::Regex;
use std::sync::LazyLock;

use crate::lemmatizer::Lemmatizer;
use crate::stopwords::StopwordFilter;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").expect("valid URL pattern"));

/// Lemmas must be longer than this many characters.
pub const MIN_TERM_CHARS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    stopwords: StopwordFilter,
    lemmatizer: Lemmatizer,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stopwords(stopwords: StopwordFilter) -> Self {
        Self {
            stopwords,
            lemmatizer: Lemmatizer::new(),
        }
    }

    pub fn stopwords(&self) -> &StopwordFilter {
        &self.stopwords
    }

    /// Lemmas of `text` that pass every filter, in text order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let cleaned = strip_urls(text).to_lowercase().replace('\u{2019}', "'");
        split_words(&cleaned)
            .into_iter()
            .filter_map(|token| self.keep(token))
            .collect()
    }

    fn keep(&self, token: &str) -> Option<String> {
        if token.is_empty() || !token.chars().all(char::is_alphabetic) {
            return None;
        }
        if self.stopwords.is_stopword(token) {
            return None;
        }
        let lemma = self.lemmatizer.lemmatize(token);
        if lemma.chars().count() <= MIN_TERM_CHARS
            || self.stopwords.is_stopword(&lemma)
            || self.stopwords.is_extra_stopword(&lemma)
        {
            return None;
        }
        Some(lemma)
    }
}

pub fn strip_urls(text: &str) -> String {
    URL_PATTERN.replace_all(text, " ").into_owned()
}

/// Split on anything that is not alphanumeric or an apostrophe, then break
/// contractions apart: `don't` -> `do` + `n't`, `cat's` -> `cat` + `'s`.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for raw in text.split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
        let word = raw.trim_matches('\'');
        if word.is_empty() {
            continue;
        }
        match contraction_split(word) {
            Some((base, suffix)) => {
                tokens.push(base);
                tokens.push(suffix);
            }
            None => tokens.push(word),
        }
    }
    tokens
}

fn contraction_split(word: &str) -> Option<(&str, &str)> {
    if let Some(base) = word.strip_suffix("n't") {
        if !base.is_empty() {
            return Some((base, &word[base.len()..]));
        }
    }
    let apostrophe = word.rfind('\'')?;
    Some((&word[..apostrophe], &word[apostrophe..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let tokenizer = Tokenizer::new();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   \n\t").is_empty());
    }

    #[test]
    fn test_basic_pipeline() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("The Volcanoes erupted near the quiet villages");
        assert_eq!(tokens.first().map(String::as_str), Some("volcano"));
        assert_eq!(tokens.last().map(String::as_str), Some("village"));
        assert!(tokens.contains(&"erupt".to_string()));
        assert!(!tokens.iter().any(|t| t == "the"));
    }

    #[test]
    fn test_urls_are_removed() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer
            .tokenize("Guitars https://example.com/volcano www.example.org/keyboard pianos");
        assert_eq!(tokens, vec!["guitar".to_string(), "piano".to_string()]);
    }

    #[test]
    fn test_short_numeric_and_mixed_tokens_dropped() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("ox 2024 covid19 v8 guitars");
        assert_eq!(tokens, vec!["guitar".to_string()]);
    }

    #[test]
    fn test_contractions() {
        assert_eq!(split_words("don't stop"), vec!["do", "n't", "stop"]);
        assert_eq!(split_words("the cat's toy"), vec!["the", "cat", "'s", "toy"]);
        assert_eq!(split_words("'quoted'"), vec!["quoted"]);
    }

    #[test]
    fn test_possessive_keeps_base_word() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("The guitarist\u{2019}s guitars");
        assert_eq!(tokens, vec!["guitarist".to_string(), "guitar".to_string()]);
    }

    #[test]
    fn test_surviving_tokens_satisfy_filters() {
        let tokenizer = Tokenizer::new();
        let text = "Reddit users LOVE posting links: https://reddit.com/r/cars! \
                    I can't believe the new engines are so fast, aren't they? \
                    Engines, ENGINES, engines and 42 turbochargers.";
        for token in tokenizer.tokenize(text) {
            assert!(token.chars().all(char::is_alphabetic), "{token}");
            assert_eq!(token, token.to_lowercase());
            assert!(token.chars().count() > MIN_TERM_CHARS, "{token}");
            assert!(!tokenizer.stopwords().is_stopword(&token), "{token}");
            assert!(!tokenizer.stopwords().is_extra_stopword(&token), "{token}");
        }
    }

    #[test]
    fn test_custom_stopwords() {
        let tokenizer = Tokenizer::with_stopwords(StopwordFilter::from_lists(&["the"], &["car"]));
        let tokens = tokenizer.tokenize("the cars and the trucks");
        assert_eq!(tokens, vec!["and".to_string(), "truck".to_string()]);
    }
}
