//! Access log.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Header set by the request-id layer in front of this middleware.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs one line per request, tagged with its request id. Server errors log at `warn`.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if response.status().is_server_error() {
        warn!(target: "http", %method, %path, status, elapsed_ms, request_id = %request_id, "Request failed");
    } else {
        info!(target: "http", %method, %path, status, elapsed_ms, request_id = %request_id, "Request completed");
    }

    response
}
