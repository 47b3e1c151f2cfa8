//! # Artifact Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/checksum/{release}/{os}/{arch}` | Hex SHA-256, `text/plain` |
//! | GET | `/release/{release}/{os}/{arch}` | Archive bytes or 307 upstream |
//!
//! Archives of the latest release are served from memory. Anything older
//! is a redirect to the upstream static download location; the mirror
//! never fetches historical binaries on demand.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use releaser_core::ArtifactKey;

use crate::analytics::ServeEvent;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checksum/{release}/{os}/{arch}", get(checksum))
        .route("/release/{release}/{os}/{arch}", get(artifact))
}

/// GET /checksum/{release}/{os}/{arch}
async fn checksum(
    State(state): State<AppState>,
    Path((release, os, arch)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let checksum = state
        .cache
        .checksum(&release, &os, &arch)
        .ok_or_else(|| AppError::not_found(format!("checksum for {release}/{os}/{arch}")))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], checksum))
}

/// GET /release/{release}/{os}/{arch}
async fn artifact(
    State(state): State<AppState>,
    Path((release, os, arch)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    // One snapshot for every lookup of this request.
    let snapshot = state.cache.snapshot();
    let key = ArtifactKey::new(&release, &os, &arch);
    let not_found = || AppError::not_found(format!("artifact {key}"));

    let file_name = snapshot.artifact_name(&key).ok_or_else(not_found)?;

    if key.release() == snapshot.latest() {
        if let Some(blob) = snapshot.blob(&key) {
            state.events.record(ServeEvent::ArtifactServed {
                release: key.release().to_string(),
                os: key.os().to_string(),
                arch: key.arch().to_string(),
            });
            let disposition = format!("attachment; filename=\"{file_name}\"");
            return Ok((
                [
                    (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                blob.clone(),
            )
                .into_response());
        }
    }

    let tag = snapshot.tag(key.release()).ok_or_else(not_found)?;
    let location = state.config.download_url(tag, file_name);
    state.events.record(ServeEvent::ArtifactRedirected {
        release: key.release().to_string(),
        os: key.os().to_string(),
        arch: key.arch().to_string(),
    });
    Ok(Redirect::temporary(&location).into_response())
}
