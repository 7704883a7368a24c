//! Request and response logging.

use std::time::Duration;

use http::request::Parts;
use tracing::{debug, error, info, warn};

use crate::responder::ApiError;
use crate::status::Status;

pub(crate) fn incoming(parts: &Parts) {
    debug!(
        method = %parts.method,
        path = parts.uri.path(),
        headers = ?parts.headers,
        "incoming request"
    );
}

/// Logs a failed request before its error response is written.
pub(crate) fn failure(method: &str, path: &str, route: Option<&str>, err: &ApiError) {
    let status = err.status().as_u16();
    let route = route.unwrap_or("-");
    // The store cause only ever reaches the log, never the client.
    let cause = std::error::Error::source(err).map(|c| c.to_string());
    if err.status().is_server_error() {
        error!(method, path, route, status, kind = err.kind(), cause = ?cause, "request failed: {err}");
    } else {
        warn!(method, path, route, status, kind = err.kind(), "request failed: {err}");
    }
}

pub(crate) fn completed(method: &str, path: &str, route: Option<&str>, status: Status, elapsed: Duration) {
    info!(
        method,
        path,
        route = route.unwrap_or("-"),
        status = status.as_u16(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "API response"
    );
}
