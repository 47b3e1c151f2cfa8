//! # Cache Errors
//!
//! Only failures that abort a whole refresh cycle are errors. Individual
//! asset failures, checksum mismatches and malformed filenames are logged
//! and the affected artifact is left out of the next snapshot.

use std::time::Duration;

use thiserror::Error;

/// Boxed upstream error, whatever the source implementation reports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`ReleaseCache`](crate::ReleaseCache) operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The upstream release listing failed.
    #[error("listing releases of {owner}/{repo} failed: {source}")]
    Upstream {
        owner: String,
        repo: String,
        source: BoxError,
    },

    /// An upstream call exceeded its deadline.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// [`ReleaseCache::start`](crate::ReleaseCache::start) was called twice.
    #[error("refresh task already started")]
    AlreadyStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_names_repository() {
        let err = CacheError::Upstream {
            owner: "acme".into(),
            repo: "tool".into(),
            source: "connection reset".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("acme/tool"), "got: {msg}");
        assert!(msg.contains("connection reset"), "got: {msg}");
    }

    #[test]
    fn timeout_display_includes_deadline() {
        let err = CacheError::Timeout {
            operation: "list releases".into(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "list releases timed out after 30s");
    }
}
