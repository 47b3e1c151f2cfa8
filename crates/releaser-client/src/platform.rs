//! Target platform naming.
//!
//! Mirrors use the OS and architecture names release tooling puts in
//! archive filenames (`linux`, `darwin`, `amd64`, `arm64`), not Rust's
//! target names.

use std::fmt;

/// An (OS, architecture) pair as it appears in artifact keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into().to_lowercase(),
            arch: arch.into().to_lowercase(),
        }
    }

    /// The platform this process runs on.
    pub fn current() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Translate Rust's `std::env::consts` names.
    pub fn from_rust(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "powerpc64" => "ppc64",
            other => other,
        };
        Self::new(os, arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
