//! Liveness check.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ping", get(ping))
}

/// GET /ping
async fn ping() -> StatusCode {
    StatusCode::OK
}
