//! # Release Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/` | 307 to `/{latest}` |
//! | GET | `/latest` | Latest release name, `text/plain` |
//! | GET | `/releases` | `{"releases": [...]}` |
//! | GET | `/{release}` | Install script for `release` |
//!
//! `/` and `/latest` answer 500 while the mirror knows no releases.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::analytics::ServeEvent;
use crate::error::AppError;
use crate::script::ScriptVars;
use crate::state::AppState;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Body of `GET /releases`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleasesResponse {
    pub releases: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/latest", get(latest))
        .route("/releases", get(list_releases))
        .route("/{release}", get(install_script))
}

fn latest_or_500(state: &AppState) -> Result<String, AppError> {
    let latest = state.cache.latest_release_name();
    if latest.is_empty() {
        return Err(AppError::Internal("no releases available".into()));
    }
    Ok(latest)
}

/// GET /: send the client to the install script of the newest release.
async fn root(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let latest = latest_or_500(&state)?;
    Ok(Redirect::temporary(&format!("/{latest}")))
}

/// GET /latest
async fn latest(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let latest = latest_or_500(&state)?;
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], latest))
}

/// GET /releases
async fn list_releases(State(state): State<AppState>) -> Json<ReleasesResponse> {
    Json(ReleasesResponse {
        releases: state.cache.release_names().into_iter().collect(),
    })
}

/// GET /{release}: render the install script.
async fn install_script(
    State(state): State<AppState>,
    Path(release): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let release = release.to_lowercase();
    if !state.cache.release_exists(&release) {
        return Err(AppError::not_found(format!("release {release}")));
    }

    let config = &state.config;
    let script = state
        .script
        .render(&ScriptVars {
            domain: &config.domain,
            version: &release,
            prefix: config.prefix(),
            binary: &config.binary,
        })
        .map_err(|e| AppError::Internal(format!("rendering install script for {release}: {e}")))?;
    state.events.record(ServeEvent::ScriptRendered { release });

    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], script))
}
