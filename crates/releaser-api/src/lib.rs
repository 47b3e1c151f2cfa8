//! # releaser-api — Axum Serving Layer
//!
//! Answers client requests from the release cache's published snapshot.
//! Handlers never wait on a refresh: every lookup is a snapshot read.
//!
//! ## API Surface
//!
//! | Path | Module | Purpose |
//! |------|--------|---------|
//! | `/ping` | [`routes::health`] | Liveness |
//! | `/`, `/latest`, `/releases`, `/{release}` | [`routes::releases`] | Release names and install scripts |
//! | `/checksum/*`, `/release/*` | [`routes::artifacts`] | Checksums and binaries |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → response headers → Handler
//! ```

pub mod analytics;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod script;
pub mod state;

pub use analytics::{EventSink, NoopEventSink, ServeEvent, TracingEventSink};
pub use error::AppError;
pub use script::{InstallScript, ScriptVars};
pub use state::{AppState, ServeConfig};

use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let server = middleware::server_header(&state.config.hostname);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::artifacts::router())
        .merge(routes::releases::router())
        .layer(from_fn_with_state(server, middleware::response_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
