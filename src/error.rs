//! Unified error type.

use crate::config::ConfigError;
use crate::store::StoreError;

/// The error type returned by the service's startup and serving paths.
///
/// Request-level failures (404, validation, store errors during a request)
/// are expressed as [`ApiError`](crate::ApiError) values and turned into
/// responses. This type surfaces infrastructure failures: bad configuration,
/// an unreachable store, or a port that cannot be bound.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}
