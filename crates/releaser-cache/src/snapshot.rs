//! # Snapshots
//!
//! A [`Snapshot`] is the complete, immutable result of one refresh cycle:
//! the release set, checksum and filename tables, the blobs of the latest
//! release, and the commit references used to diff the next cycle. The
//! cache publishes snapshots by swapping an `Arc`, so every reader sees all
//! of one snapshot or all of the next.
//!
//! ## Invariants
//!
//! - Every key in `checksums`, `artifact_names` and `blobs` names a release
//!   in `releases`.
//! - `blobs` only holds keys of `latest`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bytes::Bytes;
use releaser_core::ArtifactKey;

/// One published state of the mirror.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub(crate) latest: String,
    /// Release name → upstream tag.
    pub(crate) releases: BTreeMap<String, String>,
    pub(crate) checksums: HashMap<ArtifactKey, String>,
    pub(crate) artifact_names: HashMap<ArtifactKey, String>,
    pub(crate) blobs: HashMap<ArtifactKey, Bytes>,
    /// Release name → commit reference.
    pub(crate) commits: HashMap<String, String>,
}

impl Snapshot {
    /// Name of the newest release, empty when none are known.
    pub fn latest(&self) -> &str {
        &self.latest
    }

    /// All known release names.
    pub fn release_names(&self) -> BTreeSet<String> {
        self.releases.keys().cloned().collect()
    }

    /// Whether `name` (already lower-cased) is a known release.
    pub fn contains(&self, name: &str) -> bool {
        self.releases.contains_key(name)
    }

    /// Upstream tag of release `name`.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.releases.get(name).map(String::as_str)
    }

    /// Recorded SHA-256 of an artifact.
    pub fn checksum(&self, key: &ArtifactKey) -> Option<&str> {
        self.checksums.get(key).map(String::as_str)
    }

    /// Original upstream filename of an artifact.
    pub fn artifact_name(&self, key: &ArtifactKey) -> Option<&str> {
        self.artifact_names.get(key).map(String::as_str)
    }

    /// In-memory binary of an artifact of the latest release.
    pub fn blob(&self, key: &ArtifactKey) -> Option<&Bytes> {
        self.blobs.get(key)
    }

    /// Commit reference recorded for release `name`.
    pub fn commit(&self, name: &str) -> Option<&str> {
        self.commits.get(name).map(String::as_str)
    }

    /// Number of artifacts with a validated checksum.
    pub fn artifact_count(&self) -> usize {
        self.checksums.len()
    }

    /// Number of binaries held in memory.
    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    /// Total size of the binaries held in memory.
    pub fn blob_bytes(&self) -> usize {
        self.blobs.values().map(Bytes::len).sum()
    }

    /// Copy every checksum and filename entry of `release` from `previous`.
    pub(crate) fn carry_release(&mut self, previous: &Snapshot, release: &str) {
        for (key, checksum) in &previous.checksums {
            if key.release() == release {
                self.checksums.insert(key.clone(), checksum.clone());
            }
        }
        for (key, name) in &previous.artifact_names {
            if key.release() == release {
                self.artifact_names.insert(key.clone(), name.clone());
            }
        }
    }

    /// Check the structural invariants; used by tests.
    pub fn is_consistent(&self) -> bool {
        let known = |key: &ArtifactKey| self.releases.contains_key(key.release());
        self.checksums.keys().all(known)
            && self.artifact_names.keys().all(known)
            && self.blobs.keys().all(|k| k.release() == self.latest)
            && (self.releases.is_empty() || self.releases.contains_key(&self.latest))
    }
}
