//! # Release Descriptors
//!
//! Upstream-neutral view of a release as returned by a
//! [`ReleaseSource`](crate::ReleaseSource) listing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a release asset, used to download it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Identifier used by [`ReleaseSource::download_asset`](crate::ReleaseSource::download_asset).
    pub id: AssetId,
    /// Filename exactly as published upstream.
    pub name: String,
}

/// A named release with its assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Display name. Normalized to lower case by [`Release::normalized_name`].
    pub name: String,
    /// Git tag the release was published under; used in download URLs.
    pub tag: String,
    /// Revision the release was built from. Only compared for equality.
    pub commit: String,
    /// Attached files.
    pub assets: Vec<Asset>,
}

impl Release {
    /// Lower-cased release name, the form every table is keyed by.
    pub fn normalized_name(&self) -> String {
        self.name.to_lowercase()
    }
}
