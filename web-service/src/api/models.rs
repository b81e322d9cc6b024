use serde::{Deserialize, Serialize};

pub const DEFAULT_POST_LIMIT: u32 = 150;
pub const MAX_POST_LIMIT: u32 = 1000;
pub const DEFAULT_MAX_WORDS: usize = 300;
pub const MAX_WORDS_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct TextQuery {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    pub keyword: Option<String>,
}

/// `/cloud` parameters. Either `sub` or `category` selects the source.
#[derive(Debug, Default, Deserialize)]
pub struct CloudQuery {
    pub sub: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub max_words: Option<usize>,
    pub sort: Option<String>,
    pub time_filter: Option<String>,
    pub colormap: Option<String>,
    pub bg: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub sub: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub time_filter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub reddit_configured: bool,
}
