//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::models::*;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cloud_renderer::WordCloud;
use cloudword_core::{
    AppConfig, CoreError, RenderConfig, SortOrder, StorageError, TermCount, TermFrequency,
    TimeFilter, TOP_TERMS_LIMIT,
};
use reddit_client::{normalize_subreddit, FetchOptions, PostSource};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use term_engine::TermCounter;
use term_store::DataStore;
use tracing::info;

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// `None` when Reddit credentials are missing; subreddit endpoints then answer 503.
    pub source: Option<Arc<dyn PostSource>>,
    pub source_unavailable: Arc<str>,
    pub counter: Arc<TermCounter>,
    pub cloud: WordCloud,
    pub store: Arc<DataStore>,
    pub config: Arc<AppConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, source: Option<Arc<dyn PostSource>>, cloud: WordCloud) -> Self {
        Self {
            source,
            source_unavailable: Arc::from("Reddit credentials are not configured."),
            counter: Arc::new(TermCounter::with_extra_stopwords(
                config.extra_stopwords.as_slice(),
            )),
            cloud,
            store: Arc::new(DataStore::new(config.data_dir.clone())),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Message returned while no post source is available.
    pub fn with_unavailable_reason(mut self, reason: impl Into<String>) -> Self {
        self.source_unavailable = Arc::from(reason.into());
        self
    }

    fn source(&self) -> Result<&Arc<dyn PostSource>, ApiError> {
        self.source
            .as_ref()
            .ok_or_else(|| ApiError::ServiceUnavailable(self.source_unavailable.to_string()))
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    non_empty(value).ok_or_else(|| ApiError::BadRequest(format!("Missing '{name}' parameter")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn png_response(png: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], png).into_response()
}

/// Run CPU-bound work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {e}")))?
        .map_err(ApiError::from)
}

fn fetch_options(
    limit: Option<u32>,
    sort: Option<&str>,
    time_filter: Option<&str>,
) -> Result<FetchOptions, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_POST_LIMIT).clamp(1, MAX_POST_LIMIT);
    let sort = sort.map(SortOrder::from_str).transpose()?.unwrap_or_default();
    let time_filter = time_filter
        .map(TimeFilter::from_str)
        .transpose()?
        .unwrap_or_default();
    Ok(FetchOptions::new(sort, time_filter, limit))
}

fn known_category(state: &AppState, category: &str) -> Result<(), ApiError> {
    match state.config.subreddits_for(category) {
        Some(_) => Ok(()),
        None => Err(CoreError::from(StorageError::UnknownCategory {
            category: category.to_string(),
        })
        .into()),
    }
}

/// Fetch posts for `subreddit` and count their terms.
async fn subreddit_terms(
    state: &AppState,
    subreddit: &str,
    options: &FetchOptions,
) -> Result<TermFrequency, ApiError> {
    let source = state.source()?.clone();
    let name = normalize_subreddit(subreddit)?;

    info!(
        "Fetching {} {} posts from r/{} ({})",
        options.limit, options.sort, name, options.time_filter
    );
    let posts = source.fetch_posts(&name, options).await?;
    if posts.is_empty() {
        return Err(ApiError::NotFound(format!("No posts found for r/{name}")));
    }

    let counter = state.counter.clone();
    let frequencies = run_blocking(move || Ok(counter.count_posts(&posts))).await?;
    if frequencies.is_empty() {
        return Err(ApiError::NotFound(format!("No words found in posts for r/{name}")));
    }
    Ok(frequencies)
}

async fn render_text(state: &AppState, text: String) -> Result<Response, ApiError> {
    let counter = state.counter.clone();
    let cloud = state.cloud.clone();
    let png = run_blocking(move || {
        let frequencies = counter.count_text(&text);
        if frequencies.is_empty() {
            return Err(CoreError::invalid_input("No usable words in the text"));
        }
        Ok(cloud.render_png(&frequencies, &RenderConfig::text_default())?)
    })
    .await?;
    Ok(png_response(png))
}

async fn category_cloud(state: &AppState, category: &str) -> Result<Response, ApiError> {
    known_category(state, category)?;
    let cloud = state.cloud.clone();
    let png = state
        .store
        .cached_image(category, move |terms| {
            Ok(cloud.render_png(&terms, &RenderConfig::category_default())?)
        })
        .await?;
    Ok(png_response(png))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        reddit_configured: state.source.is_some(),
    })
}

/// `GET /cloud_from_text?text=...`
pub async fn cloud_from_text(
    State(state): State<AppState>,
    query: Result<Query<TextQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let text = required(query.text, "text")?;
    render_text(&state, text).await
}

/// `POST /text` with `{"keyword": "..."}`.
pub async fn text_cloud(
    State(state): State<AppState>,
    body: Result<Json<KeywordRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| {
        ApiError::BadRequest(format!("Request body must be JSON: {}", e.body_text()))
    })?;
    let keyword = required(request.keyword, "keyword")?;
    render_text(&state, keyword).await
}

/// `GET /cloud?sub=...` renders live posts, `GET /cloud?category=...` the cached category image.
pub async fn cloud(
    State(state): State<AppState>,
    query: Result<Query<CloudQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if let Some(category) = non_empty(query.category) {
        return category_cloud(&state, &category).await;
    }

    let sub = required(query.sub, "sub")?;
    let options = fetch_options(
        query.limit,
        query.sort.as_deref(),
        query.time_filter.as_deref(),
    )?;
    let max_words = query.max_words.unwrap_or(DEFAULT_MAX_WORDS);
    if max_words == 0 {
        return Err(ApiError::BadRequest("max_words must be at least 1".to_string()));
    }

    let mut config = RenderConfig::text_default().with_max_words(max_words.min(MAX_WORDS_LIMIT));
    if let Some(colormap) = non_empty(query.colormap) {
        config = config.with_colormap(colormap);
    }
    if let Some(bg) = non_empty(query.bg) {
        config = config.with_background(bg);
    }
    WordCloud::validate(&config)?;

    let frequencies = subreddit_terms(&state, &sub, &options).await?;
    let cloud = state.cloud.clone();
    let png = run_blocking(move || Ok(cloud.render_png(&frequencies, &config)?)).await?;
    Ok(png_response(png))
}

/// `GET /top?sub=...` or `GET /top?category=...`: the 50 most frequent terms.
pub async fn top(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> Result<Json<Vec<TermCount>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let frequencies = match non_empty(query.category) {
        Some(category) => {
            known_category(&state, &category)?;
            state.store.load_terms(&category).await?
        }
        None => {
            let sub = required(query.sub, "sub")?;
            let options = fetch_options(
                query.limit,
                query.sort.as_deref(),
                query.time_filter.as_deref(),
            )?;
            subreddit_terms(&state, &sub, &options).await?
        }
    };

    Ok(Json(frequencies.top_n(TOP_TERMS_LIMIT)))
}
