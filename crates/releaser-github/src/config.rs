//! GitHub client configuration.
//!
//! Defaults target the public `api.github.com`. Point `api_url` at a GitHub
//! Enterprise `/api/v3` root or a local mock server for testing.

use url::Url;
use zeroize::Zeroizing;

use crate::retry::RetryPolicy;

/// Default REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Releases requested per listing page (GitHub maximum).
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Configuration for connecting to the GitHub REST API.
///
/// Custom `Debug` implementation redacts the token to prevent credential
/// leakage in log output.
#[derive(Clone)]
pub struct GithubConfig {
    /// REST API root, e.g. `https://api.github.com`.
    pub api_url: Url,
    /// Optional token; anonymous access is rate-limited more aggressively.
    pub token: Option<Zeroizing<String>>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header, required by GitHub.
    pub user_agent: String,
    /// Releases requested per listing page.
    pub per_page: u32,
    /// Upper bound on listing pages followed.
    pub max_pages: u32,
    /// Transport retry schedule.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("per_page", &self.per_page)
            .field("max_pages", &self.max_pages)
            .field("retry", &self.retry)
            .finish()
    }
}

impl GithubConfig {
    /// Configuration for `api_url` with default limits.
    ///
    /// An empty token is treated as no token.
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self, ConfigError> {
        let api_url =
            Url::parse(api_url).map_err(|e| ConfigError::InvalidUrl(api_url.to_string(), e.to_string()))?;
        Ok(Self {
            api_url,
            token: token.filter(|t| !t.is_empty()).map(Zeroizing::new),
            timeout_secs: 30,
            user_agent: format!("releaser/{}", env!("CARGO_PKG_VERSION")),
            per_page: DEFAULT_PER_PAGE,
            max_pages: 10,
            retry: RetryPolicy::default(),
        })
    }

    /// Configuration for the public GitHub API.
    pub fn public(token: Option<String>) -> Result<Self, ConfigError> {
        Self::new(DEFAULT_API_URL, token)
    }

    /// Configuration pointing at a local mock server, without retries.
    pub fn local_mock(uri: &str) -> Result<Self, ConfigError> {
        let mut config = Self::new(uri, None)?;
        config.timeout_secs = 5;
        config.retry = RetryPolicy::none();
        Ok(config)
    }

    /// API root without a trailing slash, ready for path concatenation.
    pub(crate) fn api_root(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("token contains characters not allowed in a header")]
    InvalidToken,
    #[error("invalid user agent {0:?}")]
    InvalidUserAgent(String),
}
