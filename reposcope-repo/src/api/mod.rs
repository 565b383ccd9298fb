//! HTTP access to repository hosting APIs
//!
//! Only GitHub is supported: the report enumerates the authenticated user's
//! own repositories.

use reposcope_core::{ErrorContext, ScopeError, ScopeResult};
use std::collections::HashMap;

pub mod github;


pub use github::{GitHubApiClient, GitHubRepositorySource};

/// Connection settings shared by the hosting API clients
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Without a trailing slash
    pub base_url: String,
    pub access_token: Option<String>,
    /// Per request, in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Page size for list endpoints
    pub per_page: u32,
    /// Sent with every request on top of the defaults
    pub headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            timeout_seconds: 30,
            user_agent: format!("reposcope/{}", env!("CARGO_PKG_VERSION")),
            per_page: 100,
            headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    /// Public github.com with default settings
    pub fn github(access_token: Option<String>) -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            access_token,
            ..Default::default()
        }
    }

    /// Build from the `[github]` config section, resolving the token
    pub fn from_github_config(config: &reposcope_core::GitHubConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            access_token: config.resolve_token(),
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
            per_page: config.per_page,
            headers: HashMap::new(),
        }
    }

    /// Point the client at another API host (GitHub Enterprise, test servers)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// `reqwest` client carrying the user agent, auth and extra headers
pub(crate) fn create_http_client(config: &ApiClientConfig) -> ScopeResult<reqwest::Client> {
    let invalid = |message: String, source: Box<dyn std::error::Error + Send + Sync>| {
        ScopeError::Config {
            message,
            source: Some(source),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        }
    };

    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| invalid(format!("Invalid user agent: {}", e), Box::new(e)))?,
    );

    for (key, value) in &config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| invalid(format!("Invalid header name '{}': {}", key, e), Box::new(e)))?;
        let header_value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
            invalid(
                format!("Invalid header value for '{}': {}", key, e),
                Box::new(e),
            )
        })?;
        headers.insert(header_name, header_value);
    }

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| invalid(format!("Failed to create HTTP client: {}", e), Box::new(e)))
}

/// Map a failed request (no response) to an error
pub(crate) fn transport_error(error: reqwest::Error, operation: &str) -> ScopeError {
    ScopeError::Network {
        message: format!("Request failed: {}", error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("api_client")
            .with_operation(operation)
            .with_suggestion("Check network connectivity and API status"),
    }
}

/// Helper function to turn a non-success HTTP response into an error
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    operation: &str,
) -> ScopeError {
    let status = response.status();
    let url = response.url().clone();
    let headers = response.headers().clone();
    let error_body = response.text().await.unwrap_or_default();

    let message = format!(
        "HTTP {} error for {}: {}",
        status.as_u16(),
        url,
        if error_body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error")
        } else {
            error_body.as_str()
        }
    );
    let context = ErrorContext::new("api_client")
        .with_operation(operation)
        .with_metadata("status", &status.as_u16().to_string());

    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
    };
    let rate_limited = status.as_u16() == 429 || header_u64("x-ratelimit-remaining") == Some(0);

    match status.as_u16() {
        401 => ScopeError::Authentication {
            message,
            context: context.with_suggestion("Check your access token"),
        },
        403 | 429 if rate_limited => ScopeError::RateLimit {
            message,
            retry_after_ms: header_u64("retry-after").map(|secs| secs * 1000),
            context: context.with_suggestion("Wait for the rate limit window to reset"),
        },
        403 => ScopeError::Authentication {
            message,
            context: context.with_suggestion("Check repository permissions and token scopes"),
        },
        404 => ScopeError::NotFound {
            resource: url.to_string(),
            context: context.with_suggestion("Repository or file not found or not accessible"),
        },
        500..=599 => ScopeError::Network {
            message,
            source: None,
            context: context.with_suggestion("The API is having trouble, retry later"),
        },
        _ => ScopeError::Repository {
            message,
            source: None,
            context: context.with_suggestion("Check the request parameters"),
        },
    }
}
