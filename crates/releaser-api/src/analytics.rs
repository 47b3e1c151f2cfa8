//! # Usage Events
//!
//! The serving layer reports what it hands out through an [`EventSink`]
//! injected into [`AppState`](crate::AppState). There is no process-wide
//! handler; a deployment without analytics passes [`NoopEventSink`].

use std::sync::Arc;

/// Something the serving layer did for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeEvent {
    /// An install script was rendered for `release`.
    ScriptRendered { release: String },
    /// A binary of the latest release was served from memory.
    ArtifactServed {
        release: String,
        os: String,
        arch: String,
    },
    /// A client was redirected to the upstream download location.
    ArtifactRedirected {
        release: String,
        os: String,
        arch: String,
    },
}

impl ServeEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScriptRendered { .. } => "script_rendered",
            Self::ArtifactServed { .. } => "artifact_served",
            Self::ArtifactRedirected { .. } => "artifact_redirected",
        }
    }

    pub fn release(&self) -> &str {
        match self {
            Self::ScriptRendered { release }
            | Self::ArtifactServed { release, .. }
            | Self::ArtifactRedirected { release, .. } => release,
        }
    }
}

/// Destination for [`ServeEvent`]s.
///
/// Called on the request path: implementations must not block.
pub trait EventSink: Send + Sync {
    fn record(&self, event: ServeEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: ServeEvent) {}
}

/// Emits every event as a structured `tracing` record under the
/// `releaser::analytics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: ServeEvent) {
        match &event {
            ServeEvent::ScriptRendered { release } => {
                tracing::info!(target: "releaser::analytics", event = event.name(), release = %release, "serve event");
            }
            ServeEvent::ArtifactServed { release, os, arch }
            | ServeEvent::ArtifactRedirected { release, os, arch } => {
                tracing::info!(
                    target: "releaser::analytics",
                    event = event.name(),
                    release = %release,
                    os = %os,
                    arch = %arch,
                    "serve event"
                );
            }
        }
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn record(&self, event: ServeEvent) {
        (**self).record(event)
    }
}
