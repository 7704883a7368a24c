//! Process configuration from the environment.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `MONGO_URL` | yes | none; startup fails without it |
//! | `BIND_ADDR` | no | `127.0.0.1:3000` |
//!
//! Log verbosity and format are read separately by [`crate::logging`].

use std::net::SocketAddr;

pub const DATABASE_URL_VAR: &str = "MONGO_URL";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    #[error("{var} is not a valid socket address: `{value}`")]
    InvalidAddr { var: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Store connection string. Selects the backend by scheme.
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

// The connection string can carry credentials; keep it out of `{:?}`.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests never touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;

        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: BIND_ADDR_VAR,
            value: raw_addr.clone(),
        })?;

        Ok(Self { database_url, bind_addr })
    }
}
