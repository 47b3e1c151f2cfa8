//! # releaser-cache — Release Cache
//!
//! Mirrors the releases of one upstream repository. A background task polls
//! the [`ReleaseSource`] on a fixed interval; each cycle only downloads what
//! changed since the previous one and validates every binary against the
//! release's checksum manifest before publishing it.
//!
//! ## Publication
//!
//! The state of a cycle is built off to the side as a [`Snapshot`] and
//! published with a single pointer swap. Readers clone the `Arc` and never
//! block the refresh task for longer than that clone. Cycles never overlap:
//! a refresh holds an async mutex for its full duration.
//!
//! ## Lookups
//!
//! Lookups live on [`ReleaseReader`] so the HTTP layer can hold the cache as
//! a trait object. All of them lower-case their arguments.

pub mod config;
pub mod error;
pub(crate) mod refresh;
pub mod snapshot;

pub use config::CacheConfig;
pub use error::{BoxError, CacheError};
pub use refresh::CycleReport;
pub use snapshot::Snapshot;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use releaser_core::{ArtifactKey, ReleaseSource};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Read access to the published state of a release mirror.
///
/// Each lookup reads one snapshot, so a single call never mixes two cycles.
/// Callers needing several consistent answers should take
/// [`snapshot`](ReleaseReader::snapshot) once and query it directly.
pub trait ReleaseReader: Send + Sync {
    /// The currently published snapshot.
    fn snapshot(&self) -> Arc<Snapshot>;

    /// Name of the newest release, empty when none are known.
    fn latest_release_name(&self) -> String {
        self.snapshot().latest().to_string()
    }

    /// All known release names.
    fn release_names(&self) -> BTreeSet<String> {
        self.snapshot().release_names()
    }

    /// Whether a release of that name is known.
    fn release_exists(&self, release: &str) -> bool {
        self.snapshot().contains(&release.to_lowercase())
    }

    /// Upstream tag of a release, for building download URLs.
    fn release_tag(&self, release: &str) -> Option<String> {
        self.snapshot()
            .tag(&release.to_lowercase())
            .map(str::to_string)
    }

    /// Validated SHA-256 of an artifact, lower-case hex.
    fn checksum(&self, release: &str, os: &str, arch: &str) -> Option<String> {
        self.snapshot()
            .checksum(&ArtifactKey::new(release, os, arch))
            .map(str::to_string)
    }

    /// Upstream filename of an artifact.
    fn artifact_name(&self, release: &str, os: &str, arch: &str) -> Option<String> {
        self.snapshot()
            .artifact_name(&ArtifactKey::new(release, os, arch))
            .map(str::to_string)
    }

    /// In-memory binary of an artifact of the latest release.
    fn latest_artifact_blob(&self, os: &str, arch: &str) -> Option<Bytes> {
        let snapshot = self.snapshot();
        snapshot
            .blob(&ArtifactKey::new(snapshot.latest(), os, arch))
            .cloned()
    }
}

/// Mirror of one upstream repository's releases.
pub struct ReleaseCache<S: ReleaseSource> {
    source: Arc<S>,
    config: CacheConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    refresh_lock: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
    started: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ReleaseSource> std::fmt::Debug for ReleaseCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseCache")
            .field("config", &self.config)
            .field("latest", &self.snapshot.read().latest())
            .field("started", &self.started.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<S: ReleaseSource> ReleaseCache<S> {
    /// Create an empty cache. Nothing is fetched until [`start`](Self::start)
    /// or [`refresh`](Self::refresh).
    pub fn new(source: Arc<S>, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            refresh_lock: tokio::sync::Mutex::new(()),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// Settings this cache was created with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Run one refresh cycle and publish its result.
    ///
    /// On error the previous snapshot stays published.
    pub async fn refresh(&self) -> Result<CycleReport, CacheError> {
        let _cycle = self.refresh_lock.lock().await;
        let previous = self.snapshot();

        let (next, report) = refresh::run_cycle(&self.source, &self.config, &previous).await?;
        *self.snapshot.write() = Arc::new(next);

        tracing::info!(
            owner = %self.config.owner,
            repo = %self.config.repo,
            latest = %report.latest,
            changed = report.changed.len(),
            unchanged = report.unchanged.len(),
            deferred = report.deferred.len(),
            accepted = report.accepted,
            rejected = report.rejected,
            failed = report.failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "release cache refreshed"
        );
        Ok(report)
    }

    /// Run the first cycle, then keep refreshing in the background.
    ///
    /// A failing first cycle is returned and no task is spawned. Later
    /// failures are logged and the previous snapshot stays published.
    pub async fn start(self: &Arc<Self>) -> Result<CycleReport, CacheError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CacheError::AlreadyStarted);
        }

        let report = match self.refresh().await {
            Ok(report) => report,
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let cache = Arc::clone(self);
        let cancel = self.cancel.clone();
        let period = self.config.refresh_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if let Err(e) = cache.refresh().await {
                    tracing::error!("scheduled release refresh failed: {e}");
                }
            }
            tracing::debug!("release refresh task stopped");
        });
        *self.task.lock() = Some(handle);

        Ok(report)
    }

    /// Stop the background task and wait for it to exit.
    ///
    /// A cycle already in flight finishes first. The last snapshot stays
    /// readable.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("release refresh task panicked: {e}");
            }
        }
    }
}

impl<S: ReleaseSource> ReleaseReader for ReleaseCache<S> {
    fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }
}
