//! Application-only OAuth2 for Reddit.
//!
//! The client credentials grant gives a read-only bearer token without a user
//! login. Tokens are cached until shortly before they expire.

use cloudword_core::{ConfigError, CoreError, RedditApiError};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, Scope, TokenResponse, TokenUrl,
};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";

const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, PartialEq, Eq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl RedditCredentials {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }

    /// Read all three values from the process environment. None has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var_name: &str| {
            lookup(var_name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                    var_name: var_name.to_string(),
                })
        };

        Ok(Self {
            client_id: require(ENV_CLIENT_ID)?,
            client_secret: require(ENV_CLIENT_SECRET)?,
            user_agent: require(ENV_USER_AGENT)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

pub struct TokenManager {
    oauth_client: BasicClient,
    http_client: reqwest::Client,
    token: Mutex<Option<RedditToken>>,
}

impl TokenManager {
    pub fn new(
        credentials: &RedditCredentials,
        http_client: reqwest::Client,
    ) -> Result<Self, CoreError> {
        let token_url =
            Url::parse(REDDIT_TOKEN_URL).map_err(|e| invalid_url(REDDIT_TOKEN_URL, e))?;
        Self::with_token_url(credentials, http_client, token_url)
    }

    /// Use a different token endpoint (a local stand-in in tests).
    pub fn with_token_url(
        credentials: &RedditCredentials,
        http_client: reqwest::Client,
        token_url: Url,
    ) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string())
            .map_err(|e| invalid_url(REDDIT_AUTH_URL, e))?;
        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(TokenUrl::from_url(token_url)),
        );

        Ok(Self {
            oauth_client,
            http_client,
            token: Mutex::new(None),
        })
    }

    /// A valid bearer token, fetching a new one when none is cached or it expired.
    pub async fn access_token(&self) -> Result<String, CoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| !token.is_expired()) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        self.token.lock().await.take();
    }

    async fn request_token(&self) -> Result<RedditToken, CoreError> {
        debug!("Requesting application-only Reddit token");
        let http_client = self.http_client.clone();
        let response = self
            .oauth_client
            .exchange_client_credentials()
            .add_scope(Scope::new("read".to_string()))
            .request_async(|request| send_oauth_request(http_client, request))
            .await
            .map_err(|e| RedditApiError::AuthenticationFailed {
                reason: e.to_string(),
            })?;

        let lifetime = response
            .expires_in()
            .unwrap_or_else(|| Duration::from_secs(3600));
        let scope = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
            .unwrap_or_default();

        info!("Obtained Reddit token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
            scope,
        })
    }
}

/// Runs oauth2 token requests through our reqwest client so Reddit sees the
/// configured User-Agent.
async fn send_oauth_request(
    http_client: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn invalid_url(url: &str, error: url::ParseError) -> CoreError {
    CoreError::Config(ConfigError::InvalidValue {
        field: "reddit url".to_string(),
        value: format!("{url} ({error})"),
    })
}
