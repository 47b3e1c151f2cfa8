//! # releaser-github — GitHub Release Source
//!
//! Typed client for the two GitHub REST endpoints the mirror depends on:
//! the paginated release listing and single-asset downloads. It implements
//! [`releaser_core::ReleaseSource`], so the cache never talks HTTP itself.
//!
//! ## Request Conventions
//!
//! Every request carries `Accept: application/vnd.github+json`, the
//! `X-GitHub-Api-Version` header, a `User-Agent`, and, when configured, a
//! bearer token. Asset downloads override `Accept` with
//! `application/octet-stream`; GitHub answers with a redirect to its object
//! store which `reqwest` follows.

pub mod config;
pub mod error;
pub mod releases;
pub(crate) mod retry;

pub use config::{ConfigError, GithubConfig};
pub use error::GithubError;
pub use retry::RetryPolicy;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use releaser_core::{AssetId, Release, ReleaseSource};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

use crate::releases::GithubRelease;

const API_VERSION: &str = "2022-11-28";

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Create a client from configuration.
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| ConfigError::InvalidUserAgent(config.user_agent.clone()))?,
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| GithubError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// List all releases of `owner/repo`, newest first.
    ///
    /// Follows pages until one comes back short or `max_pages` is reached.
    /// Draft releases are skipped.
    pub async fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, GithubError> {
        let endpoint = format!("GET /repos/{owner}/{repo}/releases");
        let url = format!("{}/repos/{owner}/{repo}/releases", self.config.api_root());
        let per_page = self.config.per_page.max(1);

        let mut releases = Vec::new();
        for page in 1..=self.config.max_pages.max(1) {
            let query = [("per_page", per_page), ("page", page)];
            let resp = retry::retry_send(self.config.retry, &endpoint, || {
                self.http.get(&url).query(&query).send()
            })
            .await
            .map_err(|e| GithubError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
            let resp = check_status(&endpoint, resp).await?;

            let batch: Vec<GithubRelease> =
                resp.json().await.map_err(|e| GithubError::Deserialization {
                    endpoint: endpoint.clone(),
                    source: e,
                })?;
            let short = batch.len() < per_page as usize;
            releases.extend(batch.into_iter().filter_map(|release| {
                if release.draft {
                    tracing::debug!(tag = %release.tag_name, "skipping draft release");
                    None
                } else {
                    Some(Release::from(release))
                }
            }));
            if short {
                break;
            }
        }

        tracing::debug!(owner, repo, count = releases.len(), "listed releases");
        Ok(releases)
    }

    /// Download the raw contents of one release asset.
    pub async fn asset(&self, owner: &str, repo: &str, asset: AssetId) -> Result<Bytes, GithubError> {
        let endpoint = format!("GET /repos/{owner}/{repo}/releases/assets/{asset}");
        let url = format!(
            "{}/repos/{owner}/{repo}/releases/assets/{asset}",
            self.config.api_root()
        );

        let resp = retry::retry_send(self.config.retry, &endpoint, || {
            self.http
                .get(&url)
                .header(ACCEPT, "application/octet-stream")
                .send()
        })
        .await
        .map_err(|e| GithubError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let resp = check_status(&endpoint, resp).await?;

        resp.bytes().await.map_err(|e| GithubError::Http { endpoint, source: e })
    }
}

impl ReleaseSource for GithubClient {
    type Error = GithubError;

    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<Release>, Self::Error>> + Send {
        self.releases(owner, repo)
    }

    fn download_asset(
        &self,
        owner: &str,
        repo: &str,
        asset: AssetId,
    ) -> impl Future<Output = Result<Bytes, Self::Error>> + Send {
        self.asset(owner, repo, asset)
    }
}

async fn check_status(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response, GithubError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(GithubError::ApiError {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}
