//! CORS headers.

use crate::response::Response;

pub(crate) const ALLOW_ORIGIN: &str = "*";
pub(crate) const ALLOW_METHODS: &str = "GET, POST, DELETE, OPTIONS";
pub(crate) const ALLOW_HEADERS: &str = "Content-Type";
/// Preflight cache lifetime in seconds (one day).
pub(crate) const MAX_AGE: &str = "86400";

pub(crate) fn apply(res: &mut Response) {
    res.push_header("access-control-allow-origin", ALLOW_ORIGIN);
    res.push_header("access-control-allow-methods", ALLOW_METHODS);
    res.push_header("access-control-allow-headers", ALLOW_HEADERS);
    res.push_header("access-control-max-age", MAX_AGE);
}
