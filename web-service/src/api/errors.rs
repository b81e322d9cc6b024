//! API error types mapped to HTTP status codes.
//!
//! Every failure leaves a handler as an [`ApiError`], which renders as a JSON
//! body `{"error": "message"}` with the matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cloudword_core::{
    ConfigError, CoreError, ErrorExt, RedditApiError, RenderError, StorageError,
};
use serde_json::json;

/// - `BadRequest` → 400
/// - `Forbidden` → 403
/// - `NotFound` → 404
/// - `TooManyRequests` → 429
/// - `Internal` → 500
/// - `BadGateway` → 502
/// - `ServiceUnavailable` → 503
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    TooManyRequests(String),
    Internal(String),
    /// Reddit failed in a way the caller cannot fix.
    BadGateway(String),
    /// Reddit credentials are not configured.
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::TooManyRequests(msg)
            | ApiError::Internal(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = axum::Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let message = error.user_friendly_message();
        let api_error = match &error {
            CoreError::InvalidInput { .. } => ApiError::BadRequest(message),
            CoreError::NotFound { .. } => ApiError::NotFound(message),

            CoreError::RedditApi(reddit) => match reddit {
                RedditApiError::SubredditNotFound { .. } => ApiError::NotFound(message),
                RedditApiError::Forbidden { .. } => ApiError::Forbidden(message),
                RedditApiError::RateLimitExceeded { .. } => ApiError::TooManyRequests(message),
                _ => ApiError::BadGateway(message),
            },
            CoreError::Network(_) | CoreError::Timeout { .. } => ApiError::BadGateway(message),

            CoreError::Storage(
                StorageError::UnknownCategory { .. } | StorageError::DataMissing { .. },
            ) => ApiError::NotFound(message),
            CoreError::Storage(_) => ApiError::Internal(message),

            CoreError::Render(
                RenderError::InvalidCanvas { .. }
                | RenderError::UnknownColormap { .. }
                | RenderError::InvalidColor { .. }
                | RenderError::NoWords,
            ) => ApiError::BadRequest(message),
            CoreError::Render(_) => ApiError::Internal(message),

            CoreError::Config(ConfigError::MissingEnvironmentVariable { .. }) => {
                ApiError::ServiceUnavailable(message)
            }
            CoreError::Config(_)
            | CoreError::Io(_)
            | CoreError::Serialization(_)
            | CoreError::Internal { .. } => ApiError::Internal(message),
        };

        if api_error.status().is_server_error() {
            error.log_error();
        } else {
            error.log_warn();
        }
        api_error
    }
}

impl From<RenderError> for ApiError {
    fn from(error: RenderError) -> Self {
        CoreError::from(error).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: CoreError) -> StatusCode {
        ApiError::from(error).status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(CoreError::invalid_input("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::RedditApi(RedditApiError::SubredditNotFound {
                subreddit: "x".into()
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoreError::RedditApi(RedditApiError::Forbidden {
                resource: "x".into()
            })),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(CoreError::RedditApi(RedditApiError::RateLimitExceeded {
                retry_after: 3
            })),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(CoreError::RedditApi(RedditApiError::ServerError {
                status_code: 500
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(CoreError::Storage(StorageError::DataMissing {
                path: "p".into()
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoreError::Config(ConfigError::MissingEnvironmentVariable {
                var_name: "REDDIT_CLIENT_ID".into()
            })),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(CoreError::Render(RenderError::Encoding {
                reason: "r".into()
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CoreError::Render(RenderError::UnknownColormap {
                name: "nope".into()
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_input_keeps_message() {
        let error = ApiError::from(CoreError::invalid_input("Missing 'text' parameter"));
        assert_eq!(error.message(), "Missing 'text' parameter");
    }
}
