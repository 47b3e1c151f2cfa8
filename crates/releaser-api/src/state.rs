//! # Application State
//!
//! Shared state for the Axum application: the release cache (read-only),
//! the install-script template, the event sink and the serving
//! configuration. Cloning is cheap; every field is behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use releaser_cache::ReleaseReader;

use crate::analytics::{EventSink, NoopEventSink};
use crate::script::InstallScript;

/// Where GitHub serves release downloads from.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

/// Serving configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Sent as the `Server` header on every response.
    pub hostname: String,
    /// Public host clients reach the mirror on; rendered into scripts.
    pub domain: String,
    /// Whether clients reach the mirror over HTTPS.
    pub tls: bool,
    /// Executable name installed by the script.
    pub binary: String,
    /// Upstream repository owner, for redirect URLs.
    pub owner: String,
    /// Upstream repository name, for redirect URLs.
    pub repo: String,
    /// Static download host for historical releases.
    pub download_base: String,
}

impl ServeConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            hostname: "releaser".into(),
            domain: "localhost".into(),
            tls: false,
            binary: "bin".into(),
            owner: owner.into(),
            repo: repo.into(),
            download_base: DEFAULT_DOWNLOAD_BASE.into(),
        }
    }

    /// URL scheme rendered into install scripts.
    pub fn prefix(&self) -> &'static str {
        if self.tls {
            "https"
        } else {
            "http"
        }
    }

    /// Upstream static location of one release asset.
    pub fn download_url(&self, tag: &str, file_name: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}",
            self.download_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            tag,
            file_name
        )
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn ReleaseReader>,
    pub config: Arc<ServeConfig>,
    pub script: Arc<InstallScript>,
    pub events: Arc<dyn EventSink>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("latest", &self.cache.latest_release_name())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State with the embedded script and no analytics.
    pub fn new(cache: Arc<dyn ReleaseReader>, config: ServeConfig) -> Self {
        Self {
            cache,
            config: Arc::new(config),
            script: Arc::new(InstallScript::default()),
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_script(mut self, script: InstallScript) -> Self {
        self.script = Arc::new(script);
        self
    }
}
