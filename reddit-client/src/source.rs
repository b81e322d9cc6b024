use async_trait::async_trait;
use cloudword_core::{CoreError, Post, SortOrder, TimeFilter};
use futures::future::try_join_all;
use tracing::info;

/// Smallest per-subreddit fetch when a category limit is split.
pub const MIN_PER_SUBREDDIT: u32 = 10;

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub sort: SortOrder,
    pub time_filter: TimeFilter,
    pub limit: u32,
}

impl FetchOptions {
    pub fn new(sort: SortOrder, time_filter: TimeFilter, limit: u32) -> Self {
        Self {
            sort,
            time_filter,
            limit,
        }
    }

    pub fn hot(limit: u32) -> Self {
        Self::new(SortOrder::Hot, TimeFilter::Day, limit)
    }
}

/// Anything that can hand back posts for a subreddit.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(
        &self,
        subreddit: &str,
        options: &FetchOptions,
    ) -> Result<Vec<Post>, CoreError>;
}

/// Strip a leading `r/` or `/r/` and check the name against Reddit's rules.
pub fn normalize_subreddit(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let name = trimmed
        .strip_prefix("/r/")
        .or_else(|| trimmed.strip_prefix("r/"))
        .or_else(|| trimmed.strip_prefix("R/"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    if name.is_empty() {
        return Err(CoreError::invalid_input("Subreddit name must not be empty"));
    }
    let valid_chars = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_chars || !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name.len()) {
        return Err(CoreError::invalid_input(format!(
            "Invalid subreddit name: {name}"
        )));
    }
    Ok(name.to_string())
}

pub fn per_subreddit_limit(limit: u32, subreddits: usize) -> u32 {
    let count = u32::try_from(subreddits.max(1)).unwrap_or(u32::MAX);
    (limit / count).max(MIN_PER_SUBREDDIT)
}

/// Hot posts from every subreddit in a category, fetched concurrently and
/// concatenated in subreddit order. The first failure aborts the category.
pub async fn fetch_category<S>(
    source: &S,
    subreddits: &[String],
    limit: u32,
) -> Result<Vec<Post>, CoreError>
where
    S: PostSource + ?Sized,
{
    let options = FetchOptions::hot(per_subreddit_limit(limit, subreddits.len()));
    let batches = try_join_all(
        subreddits
            .iter()
            .map(|subreddit| source.fetch_posts(subreddit, &options)),
    )
    .await?;

    let posts: Vec<Post> = batches.into_iter().flatten().collect();
    info!(
        "Fetched {} posts across {} subreddits",
        posts.len(),
        subreddits.len()
    );
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_normalize_subreddit() {
        assert_eq!(normalize_subreddit("rust").unwrap(), "rust");
        assert_eq!(normalize_subreddit("r/rust").unwrap(), "rust");
        assert_eq!(normalize_subreddit("/r/AskReddit/").unwrap(), "AskReddit");
        assert_eq!(normalize_subreddit("  cars ").unwrap(), "cars");
    }

    #[test]
    fn test_normalize_rejects_bad_names() {
        let too_long = "x".repeat(22);
        for bad in ["", "r/", "a", "has space", "semi;colon", "../etc", too_long.as_str()] {
            let err = normalize_subreddit(bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput { .. }), "{bad}");
        }
    }

    #[test]
    fn test_per_subreddit_limit() {
        assert_eq!(per_subreddit_limit(150, 3), 50);
        assert_eq!(per_subreddit_limit(20, 5), 10);
        assert_eq!(per_subreddit_limit(50, 0), 50);
    }

    struct RecordingSource {
        calls: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl PostSource for RecordingSource {
        async fn fetch_posts(
            &self,
            subreddit: &str,
            options: &FetchOptions,
        ) -> Result<Vec<Post>, CoreError> {
            self.calls
                .lock()
                .unwrap()
                .push((subreddit.to_string(), options.limit));
            if subreddit == "broken" {
                return Err(CoreError::not_found(subreddit));
            }
            Ok(vec![Post {
                id: format!("{subreddit}-1"),
                subreddit: subreddit.to_string(),
                title: format!("{subreddit} title"),
                score: 1,
                num_comments: 0,
                selftext: String::new(),
            }])
        }
    }

    #[tokio::test]
    async fn test_fetch_category_concatenates_in_order() {
        let source = RecordingSource {
            calls: Mutex::new(Vec::new()),
        };
        let subs = vec!["cars".to_string(), "autos".to_string()];
        let posts = fetch_category(&source, &subs, 60).await.unwrap();

        let order: Vec<&str> = posts.iter().map(|p| p.subreddit.as_str()).collect();
        assert_eq!(order, vec!["cars", "autos"]);
        let calls = source.calls.lock().unwrap();
        assert!(calls.iter().all(|(_, limit)| *limit == 30));
    }

    #[tokio::test]
    async fn test_fetch_category_propagates_failure() {
        let source = RecordingSource {
            calls: Mutex::new(Vec::new()),
        };
        let subs = vec!["cars".to_string(), "broken".to_string()];
        assert!(fetch_category(&source, &subs, 20).await.is_err());
    }
}
