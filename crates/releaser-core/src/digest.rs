//! # SHA-256 Digests
//!
//! Artifacts are verified by comparing the lower-case hex SHA-256 of the
//! downloaded bytes with the digest recorded in the release's checksum
//! manifest.

use sha2::{Digest, Sha256};

/// Lower-case hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Whether `expected` (hex, any case) is the SHA-256 of `data`.
pub fn digest_matches(expected: &str, data: &[u8]) -> bool {
    expected.eq_ignore_ascii_case(&sha256_hex(data))
}
