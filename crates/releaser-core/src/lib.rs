//! # releaser-core — Foundational Types for Releaser
//!
//! Releaser mirrors the releases of one upstream repository: it keeps
//! checksums and filenames for every release and the full binaries of the
//! newest one in memory. This crate holds the pieces every other crate
//! agrees on:
//!
//! - [`Release`] / [`Asset`] — what the upstream listing returns.
//! - [`ArtifactKey`] — the structured `(release, os, arch)` identifier
//!   derived from an archive filename.
//! - [`manifest`] — parsing of the per-release `checksums.txt` asset.
//! - [`digest`] — SHA-256 hex digests and comparison.
//! - [`ReleaseSource`] — the seam to the upstream provider, with an
//!   in-memory [`MockReleaseSource`] for tests and local runs.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `releaser-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod key;
pub mod manifest;
pub mod release;
pub mod source;

pub use digest::{digest_matches, sha256_hex};
pub use error::KeyError;
pub use key::{is_archive, ArtifactKey, ARCHIVE_SUFFIX};
pub use manifest::{parse_manifest, ManifestEntry, CHECKSUM_MANIFEST};
pub use release::{Asset, AssetId, Release};
pub use source::{MockReleaseSource, MockSourceError, ReleaseSource};
