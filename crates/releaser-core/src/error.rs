//! # Error Types
//!
//! Errors raised while turning upstream asset filenames into
//! [`ArtifactKey`](crate::ArtifactKey)s. Transport failures belong to the
//! [`ReleaseSource`](crate::ReleaseSource) implementation and are carried by
//! its associated error type.

use thiserror::Error;

/// An asset filename that cannot be addressed by an artifact key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The filename does not carry the platform archive suffix.
    #[error("asset {0} is not a platform archive")]
    NotAnArchive(String),

    /// Fewer than three underscore-delimited tokens after the suffix is
    /// stripped, so no OS token can be found.
    #[error("asset {0} does not follow <project>_<version>_<os>_<arch>")]
    MalformedName(String),
}
