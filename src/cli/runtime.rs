use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub const APP_DIR: &str = "prompt-enhancer";

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

/// Priority: `--config` > ./config/config.yaml > <config_dir>/prompt-enhancer/config.yaml.
/// Environment overrides are applied on top of whichever file (or the defaults) won.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let mut config = read_config(&config_path).await?;
    config
        .apply_env_overrides()
        .context("Invalid environment override")?;

    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

pub async fn read_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!("Config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .await
        .context("Failed to read config file")?;
    let config: Config = if content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&content).context("Failed to parse config file")?
    };

    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

fn default_config_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/config.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push(APP_DIR);
    path.push("config.yaml");
    Ok(path)
}
