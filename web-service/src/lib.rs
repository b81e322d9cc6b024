//! HTTP front end for cloudword.
//!
//! Routes text and subreddit requests through the term pipeline and the
//! renderer, and serves cached category clouds from the data store.

/// REST API layer: Axum router, handlers, models, error mapping.
pub mod api;

pub use api::create_router;
pub use api::handlers::AppState;
