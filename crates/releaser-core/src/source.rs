//! # Release Source — Upstream Provider Interface
//!
//! [`ReleaseSource`] abstracts over the upstream provider that publishes
//! releases. Production uses the GitHub implementation in
//! `releaser-github`; tests and local runs use [`MockReleaseSource`].
//!
//! Implementations must be `Send + Sync` and return `Send` futures so the
//! cache can drive downloads from spawned tasks behind an `Arc`. Errors are
//! returned unchanged; the caller decides whether a failure is fatal.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::release::{Asset, AssetId, Release};

/// Upstream provider of releases and their assets.
pub trait ReleaseSource: Send + Sync + 'static {
    /// Error returned by both operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List the releases of `owner/repo`, newest first.
    fn list_releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<Release>, Self::Error>> + Send;

    /// Download the full contents of one asset.
    fn download_asset(
        &self,
        owner: &str,
        repo: &str,
        asset: AssetId,
    ) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
}

/// Errors produced by [`MockReleaseSource`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockSourceError {
    /// Listing was configured to fail.
    #[error("release listing unavailable")]
    ListingUnavailable,
    /// No contents registered for the asset.
    #[error("asset {0} not found")]
    AssetNotFound(AssetId),
    /// Download of the asset was configured to fail.
    #[error("download of asset {0} failed")]
    DownloadFailed(AssetId),
}

#[derive(Debug, Default)]
struct MockState {
    releases: Vec<Release>,
    contents: HashMap<AssetId, Bytes>,
    failing: HashSet<AssetId>,
    listing_fails: bool,
    next_id: u64,
    list_calls: usize,
    downloads: HashMap<AssetId, usize>,
}

/// In-memory release source.
///
/// Releases are registered newest first, mirroring upstream ordering.
/// Every call is counted so tests can assert that unchanged releases cause
/// no downloads.
#[derive(Debug, Default)]
pub struct MockReleaseSource {
    state: Mutex<MockState>,
}

impl MockReleaseSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an asset id and register its contents.
    pub fn add_asset(&self, name: &str, contents: impl Into<Bytes>) -> Asset {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = AssetId(state.next_id);
        state.contents.insert(id, contents.into());
        Asset {
            id,
            name: name.to_string(),
        }
    }

    /// Replace the release listing.
    pub fn set_releases(&self, releases: Vec<Release>) {
        self.state.lock().releases = releases;
    }

    /// Make the listing call fail (or succeed again).
    pub fn set_listing_fails(&self, fails: bool) {
        self.state.lock().listing_fails = fails;
    }

    /// Make downloads of `asset` fail.
    pub fn fail_download(&self, asset: AssetId) {
        self.state.lock().failing.insert(asset);
    }

    /// Let downloads of `asset` succeed again.
    pub fn restore_download(&self, asset: AssetId) {
        self.state.lock().failing.remove(&asset);
    }

    /// Number of listing calls so far.
    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    /// Number of downloads of `asset` so far.
    pub fn download_calls(&self, asset: AssetId) -> usize {
        self.state.lock().downloads.get(&asset).copied().unwrap_or(0)
    }

    /// Number of downloads of any asset so far.
    pub fn total_downloads(&self) -> usize {
        self.state.lock().downloads.values().sum()
    }
}

impl ReleaseSource for MockReleaseSource {
    type Error = MockSourceError;

    fn list_releases(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> impl Future<Output = Result<Vec<Release>, Self::Error>> + Send {
        let result = {
            let mut state = self.state.lock();
            state.list_calls += 1;
            if state.listing_fails {
                Err(MockSourceError::ListingUnavailable)
            } else {
                Ok(state.releases.clone())
            }
        };
        std::future::ready(result)
    }

    fn download_asset(
        &self,
        _owner: &str,
        _repo: &str,
        asset: AssetId,
    ) -> impl Future<Output = Result<Bytes, Self::Error>> + Send {
        let result = {
            let mut state = self.state.lock();
            *state.downloads.entry(asset).or_insert(0) += 1;
            if state.failing.contains(&asset) {
                Err(MockSourceError::DownloadFailed(asset))
            } else {
                state
                    .contents
                    .get(&asset)
                    .cloned()
                    .ok_or(MockSourceError::AssetNotFound(asset))
            }
        };
        std::future::ready(result)
    }
}
