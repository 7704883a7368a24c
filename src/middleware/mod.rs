//! Cross-cutting response concerns applied by the dispatcher to every
//! response, whatever produced it.
//!
//! - `cors`: permissive CORS headers on every response, not only preflight
//! - `trace`: request/response logging with method, path, route, status, latency

pub(crate) mod cors;
pub(crate) mod trace;
