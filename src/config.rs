//! Application configuration.
//!
//! Loaded from YAML (see `cli::runtime::load_config`); every field has a default so an empty or
//! missing file is a valid configuration.

use std::time::Duration;

use extensions_bridge::{config as bridge_config, ServiceEndpoint, ServiceError};
use host_page::notify::DEFAULT_NOTIFICATION_LIFETIME;
use input_locator::{LocatorError, ObserverTiming, Placement, SelectorChain, DEFAULT_SELECTORS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content_script::PageSettings;

pub const BASE_URL_ENV: &str = "PROMPT_ENHANCER_BASE_URL";
pub const TIMEOUT_ENV: &str = "PROMPT_ENHANCER_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidOverride { var: &'static str, value: String },
    #[error("invalid page.selectors: {0}")]
    Selectors(#[from] LocatorError),
    #[error(transparent)]
    Endpoint(#[from] ServiceError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub page: PageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the enhancement service; `/enhance-prompt` and `/health` hang off it.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: bridge_config::DEFAULT_BASE_URL.to_string(),
            timeout_secs: bridge_config::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Candidate input selectors, highest priority first.
    pub selectors: Vec<String>,
    pub debounce_ms: u64,
    pub initial_delay_ms: u64,
    pub blur_grace_ms: u64,
    pub notification_ms: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        let timing = ObserverTiming::default();
        Self {
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            debounce_ms: timing.debounce.as_millis() as u64,
            initial_delay_ms: timing.initial_delay.as_millis() as u64,
            blur_grace_ms: timing.blur_grace.as_millis() as u64,
            notification_ms: DEFAULT_NOTIFICATION_LIFETIME.as_millis() as u64,
        }
    }
}

impl Config {
    /// Applies `PROMPT_ENHANCER_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.service.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            self.service.timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        var: TIMEOUT_ENV,
                        value: raw.clone(),
                    })?;
            if self.service.timeout_secs == 0 {
                return Err(ConfigError::InvalidOverride {
                    var: TIMEOUT_ENV,
                    value: raw,
                });
            }
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Result<ServiceEndpoint, ConfigError> {
        Ok(ServiceEndpoint::new(
            &self.service.base_url,
            Duration::from_secs(self.service.timeout_secs),
        )?)
    }

    pub fn page_settings(&self) -> Result<PageSettings, ConfigError> {
        let page = &self.page;
        Ok(PageSettings {
            chain: SelectorChain::new(&page.selectors)?,
            timing: ObserverTiming {
                debounce: Duration::from_millis(page.debounce_ms),
                initial_delay: Duration::from_millis(page.initial_delay_ms),
                blur_grace: Duration::from_millis(page.blur_grace_ms),
            },
            placement: Placement::default(),
            notification_lifetime: Duration::from_millis(page.notification_ms),
        })
    }
}
