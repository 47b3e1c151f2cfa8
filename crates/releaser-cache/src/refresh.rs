//! # Refresh Cycle
//!
//! Computes the next [`Snapshot`] from the upstream listing and the
//! previous snapshot. Nothing here touches the published state; the caller
//! swaps the result in.
//!
//! ## Steps
//!
//! 1. **List** releases under the listing deadline. Failure aborts the cycle.
//! 2. **Diff** commit references: a release is changed when its commit
//!    differs from (or is absent in) the previous snapshot. Unchanged
//!    releases carry their checksum and filename entries over.
//! 3. **Fetch** the checksum manifest and every archive of each changed
//!    release as independent tasks, bounded by a semaphore. Manifest lines
//!    land in a shared accumulator behind its own mutex. Binaries are hashed
//!    on arrival; bytes are kept only for the latest release.
//! 4. **Validate** once every task has finished: an archive is accepted only
//!    if a checksum exists for its key and the digest matches.
//! 5. **Latest blobs**: taken from this cycle's downloads when the latest
//!    release changed. Otherwise its previous blobs are carried, and every
//!    archive of it with a checksum but no blob is downloaded again.
//!
//! ## Retries
//!
//! A changed release with a failed or timed-out download is published
//! without its new commit reference, so the next cycle diffs it as changed
//! and fetches it again. A checksum mismatch is final for the commit it was
//! seen on.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;
use releaser_core::{
    is_archive, parse_manifest, sha256_hex, ArtifactKey, Asset, Release, ReleaseSource,
    CHECKSUM_MANIFEST,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::snapshot::Snapshot;

/// Summary of one refresh cycle, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Releases whose commit reference changed or that are new.
    pub changed: Vec<String>,
    /// Releases carried over without network access.
    pub unchanged: Vec<String>,
    /// Changed releases with failed downloads, fetched again next cycle.
    pub deferred: Vec<String>,
    /// Latest release after the cycle.
    pub latest: String,
    /// Archives accepted this cycle.
    pub accepted: usize,
    /// Archives dropped for a missing or mismatched checksum.
    pub rejected: usize,
    /// Downloads that failed or timed out.
    pub failed: usize,
    /// Wall-clock duration of the cycle.
    pub elapsed: Duration,
}

/// Download work for one asset.
#[derive(Debug, Clone)]
enum Job {
    Manifest {
        release: String,
        asset: Asset,
    },
    /// `blob_only` archives belong to an unchanged latest release and are
    /// checked against its carried checksum.
    Archive {
        key: ArtifactKey,
        asset: Asset,
        keep_bytes: bool,
        blob_only: bool,
    },
}

impl Job {
    fn asset(&self) -> &Asset {
        match self {
            Job::Manifest { asset, .. } | Job::Archive { asset, .. } => asset,
        }
    }

    fn release(&self) -> &str {
        match self {
            Job::Manifest { release, .. } => release,
            Job::Archive { key, .. } => key.release(),
        }
    }
}

/// An archive that finished downloading, awaiting validation.
#[derive(Debug)]
struct Downloaded {
    key: ArtifactKey,
    file_name: String,
    digest: String,
    bytes: Option<Bytes>,
    blob_only: bool,
}

#[derive(Debug)]
enum Outcome {
    Manifest,
    Archive(Downloaded),
    /// Transport failure or timeout for an asset of this release.
    Failed(String),
}

/// Everything the download tasks of one cycle produced.
#[derive(Debug, Default)]
struct Fetched {
    downloads: Vec<Downloaded>,
    /// Releases with at least one failed download.
    incomplete: HashSet<String>,
    /// A task panicked, so its release is unknown.
    aborted: bool,
}

type ChecksumAccumulator = Arc<Mutex<HashMap<ArtifactKey, String>>>;

/// Run one refresh cycle against `previous`.
pub(crate) async fn run_cycle<S: ReleaseSource>(
    source: &Arc<S>,
    config: &CacheConfig,
    previous: &Snapshot,
) -> Result<(Snapshot, CycleReport), CacheError> {
    let started = Instant::now();
    let listing = list(source, config).await?;

    let mut next = Snapshot::default();
    let mut report = CycleReport::default();
    let mut changed: Vec<&Release> = Vec::new();
    let mut unchanged: Vec<String> = Vec::new();

    next.latest = listing.first().map(Release::normalized_name).unwrap_or_default();

    for release in &listing {
        let name = release.normalized_name();
        if next.releases.contains_key(&name) {
            tracing::warn!(release = %name, "duplicate release name in listing, keeping newest");
            continue;
        }
        next.releases.insert(name.clone(), release.tag.clone());

        if previous.commit(&name) == Some(release.commit.as_str()) {
            next.commits.insert(name.clone(), release.commit.clone());
            next.carry_release(previous, &name);
            unchanged.push(name);
        } else {
            changed.push(release);
        }
    }

    let latest_changed = changed.iter().any(|r| r.normalized_name() == next.latest);
    if !latest_changed {
        next.blobs = previous
            .blobs
            .iter()
            .filter(|(key, _)| key.release() == next.latest)
            .map(|(key, bytes)| (key.clone(), bytes.clone()))
            .collect();
    }

    tracing::info!(
        changed = changed.len(),
        unchanged = unchanged.len(),
        latest = %next.latest,
        "diffed upstream releases"
    );

    // Plan every download of this cycle.
    let mut jobs = Vec::new();
    for release in &changed {
        let name = release.normalized_name();
        jobs.extend(release_jobs(release, &name, name == next.latest, false));
    }
    if !latest_changed {
        if let Some(release) = listing.first() {
            let missing = release_jobs(release, &next.latest, true, true)
                .into_iter()
                .filter(|job| match job {
                    Job::Archive { key, .. } => {
                        next.checksum(key).is_some() && next.blob(key).is_none()
                    }
                    Job::Manifest { .. } => false,
                });
            jobs.extend(missing);
        }
    }

    let accumulator: ChecksumAccumulator = Arc::new(Mutex::new(HashMap::new()));
    let fetched = fetch_all(source, config, jobs, &accumulator, &mut report).await;
    let fetched_checksums = std::mem::take(&mut *accumulator.lock());

    for release in &changed {
        let name = release.normalized_name();
        if fetched.aborted || fetched.incomplete.contains(&name) {
            tracing::warn!(release = %name, "release incomplete, fetching again next cycle");
            report.deferred.push(name);
        } else {
            next.commits.insert(name, release.commit.clone());
        }
    }

    // Validation pass.
    for artifact in fetched.downloads {
        let expected = if artifact.blob_only {
            next.checksum(&artifact.key).map(str::to_string)
        } else {
            fetched_checksums.get(&artifact.key).cloned()
        };

        let Some(expected) = expected else {
            report.rejected += 1;
            tracing::warn!(artifact = %artifact.key, "no checksum recorded, ignoring artifact");
            continue;
        };
        if !expected.eq_ignore_ascii_case(&artifact.digest) {
            report.rejected += 1;
            tracing::warn!(
                artifact = %artifact.key,
                expected = %expected,
                computed = %artifact.digest,
                "checksum mismatch, ignoring artifact"
            );
            if artifact.blob_only {
                next.checksums.remove(&artifact.key);
                next.artifact_names.remove(&artifact.key);
            }
            continue;
        }

        report.accepted += 1;
        tracing::debug!(artifact = %artifact.key, checksum = %expected, "valid checksum");
        if !artifact.blob_only {
            next.checksums.insert(artifact.key.clone(), expected);
            next.artifact_names.insert(artifact.key.clone(), artifact.file_name);
        }
        if let Some(bytes) = artifact.bytes {
            next.blobs.insert(artifact.key, bytes);
        }
    }

    report.changed = changed.iter().map(|r| r.normalized_name()).collect();
    report.unchanged = unchanged;
    report.latest = next.latest.clone();
    report.elapsed = started.elapsed();
    Ok((next, report))
}

async fn list<S: ReleaseSource>(
    source: &Arc<S>,
    config: &CacheConfig,
) -> Result<Vec<Release>, CacheError> {
    match tokio::time::timeout(
        config.list_timeout,
        source.list_releases(&config.owner, &config.repo),
    )
    .await
    {
        Ok(Ok(releases)) => Ok(releases),
        Ok(Err(e)) => Err(CacheError::Upstream {
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            source: Box::new(e),
        }),
        Err(_) => Err(CacheError::Timeout {
            operation: format!("listing releases of {}/{}", config.owner, config.repo),
            timeout: config.list_timeout,
        }),
    }
}

/// Jobs for one release: its manifest and archives, or only its archives
/// when `blob_only`.
fn release_jobs(release: &Release, name: &str, keep_bytes: bool, blob_only: bool) -> Vec<Job> {
    let mut jobs = Vec::new();
    for asset in &release.assets {
        if asset.name.eq_ignore_ascii_case(CHECKSUM_MANIFEST) {
            if !blob_only {
                jobs.push(Job::Manifest {
                    release: name.to_string(),
                    asset: asset.clone(),
                });
            }
        } else if is_archive(&asset.name) {
            match ArtifactKey::from_file_name(name, &asset.name) {
                Ok(key) => jobs.push(Job::Archive {
                    key,
                    asset: asset.clone(),
                    keep_bytes,
                    blob_only,
                }),
                Err(e) => tracing::debug!(release = name, "ignoring asset: {e}"),
            }
        } else {
            tracing::debug!(release = name, asset = %asset.name, "ignoring non-archive asset");
        }
    }
    jobs
}

/// Run every job concurrently and wait for all of them.
async fn fetch_all<S: ReleaseSource>(
    source: &Arc<S>,
    config: &CacheConfig,
    jobs: Vec<Job>,
    accumulator: &ChecksumAccumulator,
    report: &mut CycleReport,
) -> Fetched {
    let permits = Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1)));
    let mut tasks = JoinSet::new();

    for job in jobs {
        let source = Arc::clone(source);
        let permits = Arc::clone(&permits);
        let accumulator = Arc::clone(accumulator);
        let owner = config.owner.clone();
        let repo = config.repo.clone();
        let deadline = config.download_timeout;

        tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return Outcome::Failed(job.release().to_string());
            };
            run_job(source.as_ref(), &owner, &repo, deadline, job, &accumulator).await
        });
    }

    let mut fetched = Fetched::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Outcome::Archive(artifact)) => fetched.downloads.push(artifact),
            Ok(Outcome::Manifest) => {}
            Ok(Outcome::Failed(release)) => {
                report.failed += 1;
                fetched.incomplete.insert(release);
            }
            Err(e) => {
                report.failed += 1;
                fetched.aborted = true;
                tracing::error!("download task aborted: {e}");
            }
        }
    }
    fetched
}

async fn run_job<S: ReleaseSource>(
    source: &S,
    owner: &str,
    repo: &str,
    deadline: Duration,
    job: Job,
    accumulator: &ChecksumAccumulator,
) -> Outcome {
    let asset = job.asset().clone();

    let bytes = match tokio::time::timeout(deadline, source.download_asset(owner, repo, asset.id)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            tracing::warn!(asset = %asset.name, "unable to download release asset: {e}");
            return Outcome::Failed(job.release().to_string());
        }
        Err(_) => {
            tracing::warn!(asset = %asset.name, ?deadline, "release asset download timed out");
            return Outcome::Failed(job.release().to_string());
        }
    };

    match job {
        Job::Manifest { release, .. } => {
            let entries = parse_manifest(&release, &String::from_utf8_lossy(&bytes));
            tracing::debug!(release = %release, count = entries.len(), "parsed checksum manifest");
            let mut checksums = accumulator.lock();
            for entry in entries {
                checksums.insert(entry.key, entry.digest);
            }
            Outcome::Manifest
        }
        Job::Archive {
            key,
            asset,
            keep_bytes,
            blob_only,
        } => {
            let digest = sha256_hex(&bytes);
            tracing::debug!(artifact = %key, size = bytes.len(), "downloaded artifact");
            Outcome::Archive(Downloaded {
                key,
                file_name: asset.name,
                digest,
                bytes: keep_bytes.then_some(bytes),
                blob_only,
            })
        }
    }
}
