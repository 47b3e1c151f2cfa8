//! # Response Headers
//!
//! Stamps every response with the configured `Server` name and a fixed set
//! of hardening headers. Handlers never set these themselves.

use axum::extract::{Request, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

const HARDENING: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::X_XSS_PROTECTION, "0"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
];

/// `Server` header value for `hostname`, falling back to `releaser` when
/// the hostname is not a valid header value.
pub fn server_header(hostname: &str) -> HeaderValue {
    HeaderValue::from_str(hostname).unwrap_or_else(|_| {
        tracing::warn!(hostname, "hostname is not a valid header value, using default");
        HeaderValue::from_static("releaser")
    })
}

/// Middleware adding the `Server` and hardening headers.
pub async fn response_headers(
    State(server): State<HeaderValue>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::SERVER, server);
    for (name, value) in HARDENING {
        headers
            .entry(name)
            .or_insert(HeaderValue::from_static(value));
    }
    response
}
