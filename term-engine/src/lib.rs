//! Text to term-frequency pipeline: URL stripping, tokenization,
//! lemmatization, stopword filtering and counting.

pub mod frequency;
pub mod lemmatizer;
pub mod stopwords;
pub mod tokenizer;

pub use frequency::TermCounter;
pub use lemmatizer::Lemmatizer;
pub use stopwords::{StopwordFilter, EXTRA_STOPWORDS};
pub use tokenizer::{strip_urls, Tokenizer, MIN_TERM_CHARS};
