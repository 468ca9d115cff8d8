//! Enhancement service endpoint configuration.

use std::time::Duration;

use url::Url;

use crate::service::ServiceError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub const ENHANCE_PATH: &str = "/enhance-prompt";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base_url: String,
    pub request_timeout: Duration,
}

impl ServiceEndpoint {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ServiceError::InvalidEndpoint(format!("{base_url}: {err}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ServiceError::InvalidEndpoint(format!(
                "{base_url}: unsupported scheme '{}'",
                base_url.scheme()
            )));
        }
        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `path` appended to the base URL's own path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn enhance_url(&self) -> String {
        self.url_for(ENHANCE_PATH)
    }

    pub fn health_url(&self) -> String {
        self.url_for(HEALTH_PATH)
    }
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
