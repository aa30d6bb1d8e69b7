// src/main.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use matchday::MatchdayApp;
use matchday_config::{ConfigManager, MatchdayConfig, DEFAULT_CONFIG_PATH};
use tokio::io::{stdin, stdout, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, source) = load_config(std::env::args().nth(1).map(PathBuf::from))?;

    // Initialize logging
    init_logging(&config.app.log_level)?;

    info!("Starting matchday v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }

    let mut app = MatchdayApp::new(config)
        .await
        .context("failed to initialise pipeline")?;

    app.run(BufReader::new(stdin()), stdout()).await?;

    info!("matchday shut down successfully");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level applies to every matchday crate.
fn init_logging(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("matchday={}", log_level.trim()))
            .with_context(|| format!("invalid log level {}", log_level))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

/// Explicit path must exist; the default path is optional.
fn load_config(path: Option<PathBuf>) -> Result<(MatchdayConfig, Option<PathBuf>)> {
    let path = path.or_else(|| {
        let default = Path::new(DEFAULT_CONFIG_PATH);
        default.exists().then(|| default.to_path_buf())
    });

    let manager = match &path {
        Some(path) => ConfigManager::new(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ConfigManager::from_env()?,
    };
    Ok((manager.get(), path))
}
