//! Errors returned by [`ReleaserClient`](crate::ReleaserClient).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure talking to the mirror.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The mirror answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Downloaded bytes do not hash to the served checksum.
    #[error("checksum mismatch: expected {expected}, computed {actual}")]
    InvalidChecksum { expected: String, actual: String },

    /// Base URL could not be parsed.
    #[error("invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ClientError {
    /// HTTP status of an [`ApiError`](Self::ApiError).
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
