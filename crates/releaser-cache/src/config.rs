//! Refresh cycle configuration.

use std::time::Duration;

/// Where to mirror from and how hard to poll it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Repository owner upstream.
    pub owner: String,
    /// Repository name upstream.
    pub repo: String,
    /// Period between scheduled refresh cycles.
    pub refresh_interval: Duration,
    /// Deadline for the release listing call.
    pub list_timeout: Duration,
    /// Deadline for each manifest or binary download.
    pub download_timeout: Duration,
    /// Downloads in flight at once within a cycle.
    pub max_concurrent_downloads: usize,
}

impl CacheConfig {
    /// Defaults: refresh every 60 s, 30 s deadlines, 8 concurrent downloads.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            refresh_interval: Duration::from_secs(60),
            list_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(30),
            max_concurrent_downloads: 8,
        }
    }
}
