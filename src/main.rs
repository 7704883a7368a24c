//! Service entry point.
//!
//! Run with:
//!   MONGO_URL=mongodb://127.0.0.1:27017/app RUST_LOG=info cargo run
//!
//! or without a database:
//!   MONGO_URL=memory:// cargo run

use burrow::config::Config;
use burrow::logging::{self, LogFormat};
use burrow::{routes, store, Server};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), burrow::Error> {
    logging::init(LogFormat::from_env());

    let config = Config::from_env().inspect_err(|e| error!("configuration error: {e}"))?;

    let repo = store::connect(&config.database_url)
        .await
        .inspect_err(|e| error!("failed to connect to the store: {e}"))?;
    info!("store connected");

    Server::bind(config.bind_addr)
        .serve(routes::app(repo))
        .await
        .inspect_err(|e| error!("server error: {e}"))
}
