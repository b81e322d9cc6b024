//! REST API layer built on Axum.

/// API error types mapped to HTTP status codes.
pub mod errors;
/// HTTP request handlers and application state.
pub mod handlers;
/// Query and response data transfer objects.
pub mod models;

use axum::routing::{get, post};
use axum::Router;
use handlers::AppState;
use tower_http::trace::TraceLayer;

/// Builds the Axum router with all routes and middleware layers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/cloud_from_text", get(handlers::cloud_from_text))
        .route("/text", post(handlers::text_cloud))
        .route("/cloud", get(handlers::cloud))
        .route("/top", get(handlers::top))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
