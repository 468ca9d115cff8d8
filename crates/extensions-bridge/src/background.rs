//! Privileged half of the bridge.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    channel::{Envelope, RuntimeInbox},
    messages::{EnhancementResult, RuntimeMessage},
    service::EnhancementService,
};

/// Answers `enhancePrompt` messages by calling the enhancement service.
///
/// Holds no per-request state. Every message receives exactly one reply: the service's
/// text, or an `error` value describing why there is none.
#[derive(Clone)]
pub struct BackgroundResponder {
    service: Arc<dyn EnhancementService>,
}

impl BackgroundResponder {
    pub fn new(service: Arc<dyn EnhancementService>) -> Self {
        Self { service }
    }

    /// Reply value for one raw channel message.
    pub async fn handle(&self, message: Value) -> Value {
        match serde_json::from_value::<RuntimeMessage>(message) {
            Ok(RuntimeMessage::EnhancePrompt { prompt }) => {
                let payload = self.enhance(&prompt).await.into_payload();
                serde_json::to_value(payload)
                    .unwrap_or_else(|err| json!({ "error": err.to_string() }))
            }
            Err(err) => {
                debug!(error = %err, "ignoring unrecognised runtime message");
                json!({ "error": format!("unsupported message: {err}") })
            }
        }
    }

    pub async fn enhance(&self, prompt: &str) -> EnhancementResult {
        match self.service.enhance(prompt).await {
            Ok(text) => EnhancementResult::Enhanced(text),
            Err(err) => {
                warn!(error = %err, "Error enhancing prompt");
                EnhancementResult::Failed(err.to_string())
            }
        }
    }

    /// Serves the inbox until every page-side handle is dropped. Requests are answered
    /// concurrently.
    pub async fn run(self, mut inbox: RuntimeInbox) {
        info!("AI Prompt Enhancer installed");
        while let Some(envelope) = inbox.recv().await {
            let responder = self.clone();
            tokio::spawn(async move { responder.serve(envelope).await });
        }
        debug!("runtime channel closed, background stopping");
    }

    async fn serve(&self, envelope: Envelope) {
        let reply = self.handle(envelope.message.clone()).await;
        debug!(request = %envelope.request_id, "replying to runtime message");
        envelope.respond(reply);
    }
}
