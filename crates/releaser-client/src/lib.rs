//! # releaser-client — Mirror Client
//!
//! Typed client for the HTTP surface of a Releaser mirror, for tools that
//! update themselves. Binary downloads follow the mirror's redirects for
//! historical releases; [`ReleaserClient::download_verified`] checks the
//! bytes against the mirror's checksum before returning them.
//!
//! ## Endpoints
//!
//! | Method | Path | Client method |
//! |--------|------|---------------|
//! | GET | `/releases` | [`ReleaserClient::releases`] |
//! | GET | `/latest` | [`ReleaserClient::latest`] |
//! | GET | `/checksum/{release}/{os}/{arch}` | [`ReleaserClient::checksum`] |
//! | GET | `/release/{release}/{os}/{arch}` | [`ReleaserClient::binary`] |

pub mod error;
pub mod platform;

pub use error::ClientError;
pub use platform::Platform;

use std::time::Duration;

use bytes::Bytes;
use releaser_core::digest_matches;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use url::Url;

/// `User-Agent` sent to mirrors.
pub const AGENT_NAME: &str = "Releaser Agent";

#[derive(Debug, Deserialize)]
struct ReleasesBody {
    releases: Vec<String>,
}

/// Client for one mirror.
#[derive(Debug, Clone)]
pub struct ReleaserClient {
    http: reqwest::Client,
    base: Url,
}

impl ReleaserClient {
    /// Client for the mirror at `base`, e.g. `https://get.example.com`.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base, Duration::from_secs(60))
    }

    pub fn with_timeout(base: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base).map_err(|e| ClientError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: base.to_string(),
                reason: "not a base URL".into(),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(AGENT_NAME));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, base: base_url })
    }

    /// Every release name the mirror knows.
    pub async fn releases(&self) -> Result<Vec<String>, ClientError> {
        let endpoint = "GET /releases";
        let resp = self.get(endpoint, &["releases"]).await?;
        let body: ReleasesBody = resp.json().await.map_err(|e| ClientError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        Ok(body.releases)
    }

    /// Name of the newest release.
    pub async fn latest(&self) -> Result<String, ClientError> {
        self.text("GET /latest", &["latest"]).await
    }

    /// Hex SHA-256 of `release` for `platform`.
    pub async fn checksum(&self, release: &str, platform: &Platform) -> Result<String, ClientError> {
        let endpoint = format!("GET /checksum/{release}/{platform}");
        let checksum = self
            .text(&endpoint, &["checksum", release, &platform.os, &platform.arch])
            .await?;
        Ok(checksum.trim().to_string())
    }

    /// Raw archive of `release` for `platform`, unverified.
    pub async fn binary(&self, release: &str, platform: &Platform) -> Result<Bytes, ClientError> {
        let endpoint = format!("GET /release/{release}/{platform}");
        let resp = self
            .get(&endpoint, &["release", release, &platform.os, &platform.arch])
            .await?;
        resp.bytes().await.map_err(|e| ClientError::Http { endpoint, source: e })
    }

    /// Download the archive and verify it against the served checksum.
    pub async fn download_verified(&self, release: &str, platform: &Platform) -> Result<Bytes, ClientError> {
        let body = self.binary(release, platform).await?;
        let expected = self.checksum(release, platform).await?;

        if !digest_matches(&expected, &body) {
            return Err(ClientError::InvalidChecksum {
                expected,
                actual: releaser_core::sha256_hex(&body),
            });
        }
        tracing::debug!(release, %platform, size = body.len(), "verified release download");
        Ok(body)
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, endpoint: &str, segments: &[&str]) -> Result<reqwest::Response, ClientError> {
        let resp = self
            .http
            .get(self.url(segments))
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::ApiError {
            endpoint: endpoint.to_string(),
            status,
            body,
        })
    }

    async fn text(&self, endpoint: &str, segments: &[&str]) -> Result<String, ClientError> {
        let resp = self.get(endpoint, segments).await?;
        resp.text().await.map_err(|e| ClientError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}
