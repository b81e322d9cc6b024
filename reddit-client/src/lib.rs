//! Read-only Reddit access for subreddit listings.

pub mod api;
pub mod auth;
pub mod rate_limiter;
pub mod source;


pub use api::{RedditApiClient, RedditListing, RedditPostData, MAX_PAGE_SIZE, REDDIT_API_BASE};
pub use auth::{RedditCredentials, RedditToken, TokenManager};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use source::{fetch_category, normalize_subreddit, per_subreddit_limit, FetchOptions, PostSource};

use async_trait::async_trait;
use cloudword_core::{CoreError, Post, RedditApiError};
use tracing::{debug, info, warn};
use url::Url;

/// Authenticated listing client. Holds one cached application token.
pub struct RedditClient {
    api: RedditApiClient,
    tokens: TokenManager,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Result<Self, CoreError> {
        let api = RedditApiClient::new(credentials.user_agent.clone())?;
        let tokens = TokenManager::new(&credentials, api.http_client())?;
        Ok(Self { api, tokens })
    }

    /// Point both the listing API and the token endpoint elsewhere.
    pub fn with_endpoints(
        credentials: RedditCredentials,
        api_base: &str,
        token_url: Url,
    ) -> Result<Self, CoreError> {
        let api = RedditApiClient::with_base_url(credentials.user_agent.clone(), api_base)?;
        let tokens = TokenManager::with_token_url(&credentials, api.http_client(), token_url)?;
        Ok(Self { api, tokens })
    }

    pub fn api(&self) -> &RedditApiClient {
        &self.api
    }

    /// Up to `options.limit` posts, following `after` cursors across pages.
    pub async fn fetch_posts(
        &self,
        subreddit: &str,
        options: &FetchOptions,
    ) -> Result<Vec<Post>, CoreError> {
        let subreddit = normalize_subreddit(subreddit)?;
        let limit = options.limit as usize;
        let access_token = self.tokens.access_token().await?;

        let mut posts: Vec<Post> = Vec::with_capacity(limit);
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let page_size = (limit - posts.len()).min(MAX_PAGE_SIZE as usize) as u32;
            let listing = match self
                .api
                .get_subreddit_posts(
                    &access_token,
                    &subreddit,
                    options.sort,
                    options.time_filter,
                    page_size,
                    after.as_deref(),
                )
                .await
            {
                Ok(listing) => listing,
                Err(CoreError::RedditApi(RedditApiError::InvalidToken)) => {
                    warn!("Reddit rejected the cached token, clearing it");
                    self.tokens.invalidate().await;
                    return Err(CoreError::RedditApi(RedditApiError::InvalidToken));
                }
                Err(e) => return Err(e),
            };

            let page_len = listing.data.children.len();
            posts.extend(listing.data.children.into_iter().map(|child| Post::from(child.data)));
            after = listing.data.after;
            debug!("Fetched page of {} posts from r/{}", page_len, subreddit);

            if page_len == 0 || after.is_none() {
                break;
            }
        }

        posts.truncate(limit);
        info!("Fetched {} posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_posts(
        &self,
        subreddit: &str,
        options: &FetchOptions,
    ) -> Result<Vec<Post>, CoreError> {
        RedditClient::fetch_posts(self, subreddit, options).await
    }
}
