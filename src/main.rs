//! Audience categorizer server entry point
//!
//! Usage: `audience-categorizer [config.toml]`
//! The config path may also come from `CATEGORIZER_CONFIG`.

use anyhow::{Context, Result};
use audience_categorizer::{config::Config, logging, server};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CATEGORIZER_CONFIG").ok())
        .map(PathBuf::from);

    let config = Config::load(config_path).context("Failed to load configuration")?;

    logging::init(&config.logging);
    info!("Starting audience categorizer v{}", env!("CARGO_PKG_VERSION"));

    server::run(config).await.context("Server error")?;

    Ok(())
}
