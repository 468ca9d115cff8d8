use anyhow::{bail, Result};
use extensions_bridge::{check_health, HealthStatus, HttpEnhancementService};

use crate::config::Config;

/// Reads the service's health endpoint and prints the status line.
pub async fn cmd_status(config: &Config) -> Result<()> {
    let endpoint = config.endpoint()?;
    let health_url = endpoint.health_url();
    let service = HttpEnhancementService::new(endpoint)?;

    let status = check_health(&service).await;
    println!("{}", status.message());
    match status {
        HealthStatus::Connected => Ok(()),
        HealthStatus::Disconnected(reason) => bail!("{health_url} is unreachable: {reason}"),
    }
}
