//! Outbound calls to the enhancement service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::ServiceEndpoint,
    messages::{EnhanceRequestBody, EnhanceResponseBody},
};

pub const HEALTH_CONNECTED_MESSAGE: &str = "Backend connected and ready!";
pub const HEALTH_DISCONNECTED_MESSAGE: &str = "Backend not connected. Please start your server.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid service endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ServiceError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(timeout)
        } else if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Status(status.as_u16())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// The remote enhancement service.
#[async_trait]
pub trait EnhancementService: Send + Sync {
    /// Returns the rewritten prompt.
    async fn enhance(&self, prompt: &str) -> Result<String, ServiceError>;

    /// Succeeds when the service answers its health endpoint with a 2xx status.
    async fn health(&self) -> Result<(), ServiceError>;
}

pub struct HttpEnhancementService {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl HttpEnhancementService {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(endpoint.request_timeout)
            .build()
            .map_err(|err| ServiceError::Transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    fn map_err(&self, err: reqwest::Error) -> ServiceError {
        ServiceError::from_reqwest(err, self.endpoint.request_timeout)
    }
}

#[async_trait]
impl EnhancementService for HttpEnhancementService {
    async fn enhance(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = self.endpoint.enhance_url();
        debug!(%url, chars = prompt.chars().count(), "posting prompt");

        let response = self
            .client
            .post(&url)
            .json(&EnhanceRequestBody { prompt })
            .send()
            .await
            .map_err(|err| self.map_err(err))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "enhancement service rejected request");
            return Err(ServiceError::Status(status.as_u16()));
        }

        let body: EnhanceResponseBody = response.json().await.map_err(|err| self.map_err(err))?;
        Ok(body.enhanced)
    }

    async fn health(&self) -> Result<(), ServiceError> {
        let response = self
            .client
            .get(self.endpoint.health_url())
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status(status.as_u16()))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    Connected,
    Disconnected(String),
}

impl HealthStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, HealthStatus::Connected)
    }

    /// Status line shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            HealthStatus::Connected => HEALTH_CONNECTED_MESSAGE,
            HealthStatus::Disconnected(_) => HEALTH_DISCONNECTED_MESSAGE,
        }
    }
}

pub async fn check_health(service: &dyn EnhancementService) -> HealthStatus {
    match service.health().await {
        Ok(()) => HealthStatus::Connected,
        Err(err) => {
            debug!(error = %err, "health check failed");
            HealthStatus::Disconnected(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REQUEST_TIMEOUT;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_for(server: &MockServer) -> HttpEnhancementService {
        let endpoint = ServiceEndpoint::new(&server.uri(), DEFAULT_REQUEST_TIMEOUT).unwrap();
        HttpEnhancementService::new(endpoint).unwrap()
    }

    #[tokio::test]
    async fn posts_prompt_and_returns_enhanced_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance-prompt"))
            .and(body_json(json!({"prompt": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"enhanced": "Hello, world!"})))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        assert_eq!(service.enhance("hello").await.unwrap(), "Hello, world!");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance-prompt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = service_for(&server).await.enhance("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Status(500)));
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn body_without_text_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance-prompt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let err = service_for(&server).await.enhance("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[tokio::test]
    async fn health_reflects_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let status = check_health(&service_for(&server).await).await;
        assert_eq!(status, HealthStatus::Connected);
        assert_eq!(status.message(), "Backend connected and ready!");

        let silent = MockServer::start().await;
        let status = check_health(&service_for(&silent).await).await;
        assert!(!status.is_connected());
        assert_eq!(
            status.message(),
            "Backend not connected. Please start your server."
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let endpoint =
            ServiceEndpoint::new("http://127.0.0.1:9", Duration::from_secs(5)).unwrap();
        let service = HttpEnhancementService::new(endpoint).unwrap();
        let err = service.enhance("x").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Transport(_) | ServiceError::Timeout(_)
        ));
    }
}
