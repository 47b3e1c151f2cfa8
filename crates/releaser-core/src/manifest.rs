//! # Checksum Manifests
//!
//! Each release publishes a `checksums.txt` asset in the `sha256sum`
//! format: one `"<hex digest>  <filename>"` line per archive, two spaces
//! between the fields. Lines that do not name a platform archive, or whose
//! filename cannot be turned into an [`ArtifactKey`], are skipped.

use crate::key::{is_archive, ArtifactKey};

/// Filename of the per-release checksum manifest asset.
pub const CHECKSUM_MANIFEST: &str = "checksums.txt";

/// Field separator used by `sha256sum`.
const FIELD_SEPARATOR: &str = "  ";

/// One usable line of a checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Key derived from the filename.
    pub key: ArtifactKey,
    /// Hex digest, lower-cased.
    pub digest: String,
}

/// Parse the manifest of `release`.
pub fn parse_manifest(release: &str, contents: &str) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(FIELD_SEPARATOR);
        let (Some(digest), Some(file_name)) = (fields.next(), fields.next()) else {
            tracing::debug!(release, line, "ignoring checksum line");
            continue;
        };
        if !is_archive(file_name) {
            tracing::debug!(release, file_name, "ignoring checksum for non-archive asset");
            continue;
        }
        match ArtifactKey::from_file_name(release, file_name) {
            Ok(key) => entries.push(ManifestEntry {
                key,
                digest: digest.to_lowercase(),
            }),
            Err(e) => tracing::debug!(release, "ignoring checksum: {e}"),
        }
    }
    entries
}
