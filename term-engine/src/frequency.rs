use cloudword_core::{Post, TermFrequency};
use tracing::debug;

use crate::stopwords::StopwordFilter;
use crate::tokenizer::Tokenizer;

/// Counts lemmas across posts or free text.
#[derive(Debug, Clone, Default)]
pub struct TermCounter {
    tokenizer: Tokenizer,
}

impl TermCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// English stopwords plus the built-in extras plus `extra`.
    pub fn with_extra_stopwords<S: AsRef<str>>(extra: &[S]) -> Self {
        let mut stopwords = StopwordFilter::english();
        stopwords.add_extra(extra);
        Self::with_tokenizer(Tokenizer::with_stopwords(stopwords))
    }

    pub fn count_text(&self, text: &str) -> TermFrequency {
        self.tokenizer.tokenize(text).into_iter().collect()
    }

    /// Title and selftext of every post, tokenized and tallied.
    pub fn count_posts(&self, posts: &[Post]) -> TermFrequency {
        let mut frequency = TermFrequency::new();
        for post in posts {
            frequency.extend(self.tokenizer.tokenize(&post.text()));
        }
        debug!(
            "Counted {} distinct terms ({} total) across {} posts",
            frequency.len(),
            frequency.total(),
            posts.len()
        );
        frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudword_core::TOP_TERMS_LIMIT;

    fn post(title: &str, selftext: &str) -> Post {
        Post {
            id: "id".to_string(),
            subreddit: "test".to_string(),
            title: title.to_string(),
            score: 0,
            num_comments: 0,
            selftext: selftext.to_string(),
        }
    }

    #[test]
    fn test_cats_and_dogs() {
        let posts: Vec<Post> = serde_json::from_str(
            r#"[{"id":"1","subreddit":"pets","title":"cats and dogs","selftext":"cats are great"}]"#,
        )
        .unwrap();
        let counts = TermCounter::new().count_posts(&posts);
        assert_eq!(counts.get("cat"), Some(2));
        assert_eq!(counts.get("dog"), Some(1));
        assert_eq!(counts.get("and"), None);
    }

    #[test]
    fn test_title_and_body_do_not_merge() {
        let counts = TermCounter::new().count_posts(&[post("guitar", "piano")]);
        assert_eq!(counts.get("guitar"), Some(1));
        assert_eq!(counts.get("piano"), Some(1));
        assert_eq!(counts.get("guitarpiano"), None);
    }

    #[test]
    fn test_order_independent_counts() {
        let posts = vec![
            post("Volcano eruptions", "lava lava everywhere"),
            post("Lava lamps", ""),
            post("", "Volcanic lava"),
        ];
        let mut reversed = posts.clone();
        reversed.reverse();

        let counter = TermCounter::new();
        let forward = counter.count_posts(&posts);
        let backward = counter.count_posts(&reversed);
        assert_eq!(forward.len(), backward.len());
        for (term, count) in forward.iter() {
            assert_eq!(backward.get(term), Some(count), "{term}");
        }
        assert_eq!(forward.get("lava"), Some(4));
    }

    #[test]
    fn test_configured_extra_stopwords() {
        let counter = TermCounter::with_extra_stopwords(&["Upvote".to_string()]);
        let counts = counter.count_text("upvote this guitar, upvotes welcome");
        assert_eq!(counts.get("upvote"), None);
        assert_eq!(counts.get("guitar"), Some(1));
        assert!(TermCounter::new().count_text("upvote").get("upvote").is_some());
    }

    #[test]
    fn test_empty_posts() {
        let counts = TermCounter::new().count_posts(&[post("", "")]);
        assert!(counts.is_empty());
        assert!(TermCounter::new().count_posts(&[]).is_empty());
    }

    #[test]
    fn test_top_terms_sorted_without_duplicates() {
        let text = (0..70u8)
            .map(|i| {
                let word = format!("zq{}{}x ", (b'a' + i / 26) as char, (b'a' + i % 26) as char);
                word.repeat(1 + usize::from(i % 3))
            })
            .collect::<String>();
        let counter = TermCounter::new();
        let counts = counter.count_text(&format!("{text} guitars guitars guitar"));
        let top = counts.top_n(TOP_TERMS_LIMIT);

        assert!(top.len() <= TOP_TERMS_LIMIT);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        let mut terms: Vec<&str> = top.iter().map(|t| t.term.as_str()).collect();
        terms.sort_unstable();
        terms.dedup();
        assert_eq!(terms.len(), top.len());
    }
}
