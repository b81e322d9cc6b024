use cloudword_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, RedditApiError, RenderError, StorageError,
};
use std::time::Duration;

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let render_error = CoreError::Render(RenderError::NoWords);
    assert_eq!(render_error.error_code(), "RENDER");

    let storage_error = CoreError::Storage(StorageError::UnknownCategory {
        category: "cooking".to_string(),
    });
    assert_eq!(storage_error.error_code(), "STORAGE");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_ID".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    assert_eq!(
        CoreError::invalid_input("text required").error_code(),
        "INVALID_INPUT"
    );
}

#[test]
fn test_nested_error_codes() {
    let error = RedditApiError::SubredditNotFound {
        subreddit: "nope".to_string(),
    };
    assert_eq!(error.error_code(), "REDDIT_SUBREDDIT_NOT_FOUND");

    let error = RenderError::UnknownColormap {
        name: "sparkle".to_string(),
    };
    assert_eq!(error.error_code(), "RENDER_UNKNOWN_COLORMAP");
}

#[test]
fn test_retryable_errors() {
    let retryable_error =
        CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
    assert!(retryable_error.is_retryable());

    let server_error = CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 });
    assert!(server_error.is_retryable());

    let non_retryable_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_SECRET".to_string(),
    });
    assert!(!non_retryable_error.is_retryable());
    assert!(!CoreError::Render(RenderError::NoWords).is_retryable());
}

#[test]
fn test_retry_after() {
    let rate_limit_error =
        CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
    assert_eq!(
        rate_limit_error.retry_after(),
        Some(Duration::from_secs(60))
    );

    let timeout_error = CoreError::Timeout { seconds: 30 };
    assert_eq!(timeout_error.retry_after(), Some(Duration::from_secs(30)));

    assert_eq!(CoreError::not_found("r/empty").retry_after(), None);
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_USER_AGENT".to_string(),
    });
    let message = config_error.user_friendly_message();
    assert!(message.contains("REDDIT_USER_AGENT"));

    let input_error = CoreError::invalid_input("keyword cannot be empty");
    assert_eq!(input_error.user_friendly_message(), "keyword cannot be empty");
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new()
        .with_error_reporting(true)
        .with_warning_reporting(true);
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_warning(&error);
}
