//! # Configuration
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. command-line flags, or their `RELEASER_*` environment variables
//! 2. the YAML file given with `--config`
//! 3. built-in defaults
//!
//! The resolved [`Config`] is validated before anything connects upstream.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_DOMAIN: &str = "localhost";
pub const DEFAULT_BINARY: &str = "bin";
pub const DEFAULT_HOSTNAME: &str = "releaser";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 8;
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting is empty.
    #[error("{0} is required")]
    Required(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Contents of a YAML config file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub github_token: Option<String>,
    pub repository: Option<String>,
    pub repository_owner: Option<String>,
    pub hostname: Option<String>,
    pub listen_address: Option<String>,
    pub tls: Option<bool>,
    pub domain: Option<String>,
    pub binary: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub max_concurrent_downloads: Option<usize>,
    pub github_api_url: Option<String>,
    pub download_base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Overlay `overrides`: every value set there wins.
    pub fn merge(self, overrides: FileConfig) -> FileConfig {
        FileConfig {
            github_token: overrides.github_token.or(self.github_token),
            repository: overrides.repository.or(self.repository),
            repository_owner: overrides.repository_owner.or(self.repository_owner),
            hostname: overrides.hostname.or(self.hostname),
            listen_address: overrides.listen_address.or(self.listen_address),
            tls: overrides.tls.or(self.tls),
            domain: overrides.domain.or(self.domain),
            binary: overrides.binary.or(self.binary),
            refresh_interval_secs: overrides.refresh_interval_secs.or(self.refresh_interval_secs),
            max_concurrent_downloads: overrides
                .max_concurrent_downloads
                .or(self.max_concurrent_downloads),
            github_api_url: overrides.github_api_url.or(self.github_api_url),
            download_base_url: overrides.download_base_url.or(self.download_base_url),
        }
    }
}

/// Fully resolved settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub github_token: Option<String>,
    pub repository: String,
    pub repository_owner: String,
    pub hostname: String,
    pub listen_address: String,
    pub tls: bool,
    pub domain: String,
    pub binary: String,
    pub refresh_interval_secs: u64,
    pub max_concurrent_downloads: usize,
    pub github_api_url: String,
    pub download_base_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("repository", &self.repository)
            .field("repository_owner", &self.repository_owner)
            .field("hostname", &self.hostname)
            .field("listen_address", &self.listen_address)
            .field("tls", &self.tls)
            .field("domain", &self.domain)
            .field("binary", &self.binary)
            .field("refresh_interval_secs", &self.refresh_interval_secs)
            .field("max_concurrent_downloads", &self.max_concurrent_downloads)
            .field("github_api_url", &self.github_api_url)
            .field("download_base_url", &self.download_base_url)
            .finish()
    }
}

impl Config {
    /// Apply defaults to merged layers. The hostname falls back to the
    /// `HOSTNAME` environment variable before the built-in default.
    pub fn resolve(layers: FileConfig) -> Self {
        Self {
            github_token: layers.github_token.filter(|t| !t.is_empty()),
            repository: layers.repository.unwrap_or_default(),
            repository_owner: layers.repository_owner.unwrap_or_default(),
            hostname: layers.hostname.unwrap_or_else(default_hostname),
            listen_address: layers
                .listen_address
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.into()),
            tls: layers.tls.unwrap_or(false),
            domain: layers.domain.unwrap_or_else(|| DEFAULT_DOMAIN.into()),
            binary: layers.binary.unwrap_or_else(|| DEFAULT_BINARY.into()),
            refresh_interval_secs: layers
                .refresh_interval_secs
                .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS),
            max_concurrent_downloads: layers
                .max_concurrent_downloads
                .unwrap_or(DEFAULT_MAX_CONCURRENT_DOWNLOADS),
            github_api_url: layers
                .github_api_url
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.into()),
            download_base_url: layers
                .download_base_url
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE_URL.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("repository", &self.repository),
            ("repository owner", &self.repository_owner),
            ("hostname", &self.hostname),
            ("listen address", &self.listen_address),
            ("domain", &self.domain),
            ("binary", &self.binary),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Required(name));
            }
        }

        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh_interval_secs",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_concurrent_downloads == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_downloads",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn default_hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HOSTNAME.into())
}
