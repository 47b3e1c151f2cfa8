//! # Artifact Keys
//!
//! Every platform-specific archive is addressed by an [`ArtifactKey`]: the
//! release it belongs to, the target OS, and the target architecture. Keys
//! are derived from upstream filenames following the
//! `<project>_<version>_<os>_<arch tokens...>.tar.gz` convention.
//!
//! The key stays a structured tuple. Architectures such as `amd64_v2` contain
//! the separator character, so a concatenated string key could not be split
//! back apart unambiguously.

use std::fmt;

use crate::error::KeyError;

/// Suffix carried by every platform archive.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Unique identifier of one platform-specific artifact.
///
/// All three components are stored lower-cased so that lookups are
/// case-insensitive regardless of how the caller spells them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey {
    release: String,
    os: String,
    arch: String,
}

impl ArtifactKey {
    /// Build a key from its components, normalizing case.
    pub fn new(release: &str, os: &str, arch: &str) -> Self {
        Self {
            release: release.to_lowercase(),
            os: os.to_lowercase(),
            arch: arch.to_lowercase(),
        }
    }

    /// Derive the key of an archive asset belonging to `release`.
    ///
    /// The archive suffix is stripped and the remainder split on `_`. The
    /// third token is the OS; everything after it, underscores included, is
    /// the architecture.
    pub fn from_file_name(release: &str, file_name: &str) -> Result<Self, KeyError> {
        let lowered = file_name.to_lowercase();
        let stem = lowered
            .strip_suffix(ARCHIVE_SUFFIX)
            .ok_or_else(|| KeyError::NotAnArchive(file_name.to_string()))?;

        let mut tokens = stem.splitn(4, '_');
        let (Some(_project), Some(_version), Some(os)) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(KeyError::MalformedName(file_name.to_string()));
        };
        let arch = tokens.next().unwrap_or_default();

        Ok(Self {
            release: release.to_lowercase(),
            os: os.to_string(),
            arch: arch.to_string(),
        })
    }

    /// Release name component.
    pub fn release(&self) -> &str {
        &self.release
    }

    /// Operating system component.
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Architecture component, possibly containing `_`.
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.release, self.os, self.arch)
    }
}

/// Whether `file_name` names a platform archive (case-insensitive).
pub fn is_archive(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(ARCHIVE_SUFFIX)
}
