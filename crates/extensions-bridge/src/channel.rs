//! Runtime messaging channel between the page context and the background.
//!
//! Each envelope carries a JSON message and a one-shot reply slot. The background answers an
//! envelope at most once; dropping it unanswered surfaces on the page side as
//! [`BridgeError::NoReply`].

use async_trait::async_trait;
use enhancer_core_types::RequestId;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::{
    messages::{ReplyPayload, RuntimeMessage},
    BridgeError,
};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
pub struct Envelope {
    pub request_id: RequestId,
    pub message: Value,
    reply: oneshot::Sender<Value>,
}

impl Envelope {
    /// Answers the sender. A sender that has gone away is not an error for the responder.
    pub fn respond(self, reply: Value) {
        if self.reply.send(reply).is_err() {
            debug!(request = %self.request_id, "reply dropped, sender is gone");
        }
    }
}

/// Background end of the channel.
#[derive(Debug)]
pub struct RuntimeInbox {
    rx: mpsc::Receiver<Envelope>,
}

impl RuntimeInbox {
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}

/// Page end of the channel.
#[derive(Clone, Debug)]
pub struct RuntimeChannel {
    tx: mpsc::Sender<Envelope>,
}

pub fn runtime_channel(capacity: usize) -> (RuntimeChannel, RuntimeInbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RuntimeChannel { tx }, RuntimeInbox { rx })
}

/// Sends one runtime message and waits for its reply.
#[async_trait]
pub trait RuntimeMessenger: Send + Sync {
    async fn send_message(
        &self,
        request_id: RequestId,
        message: &RuntimeMessage,
    ) -> Result<ReplyPayload, BridgeError>;
}

#[async_trait]
impl RuntimeMessenger for RuntimeChannel {
    async fn send_message(
        &self,
        request_id: RequestId,
        message: &RuntimeMessage,
    ) -> Result<ReplyPayload, BridgeError> {
        let message =
            serde_json::to_value(message).map_err(|err| BridgeError::Encode(err.to_string()))?;
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope {
                request_id,
                message,
                reply,
            })
            .await
            .map_err(|_| BridgeError::ChannelClosed)?;

        let value = response.await.map_err(|_| BridgeError::NoReply)?;
        serde_json::from_value(value).map_err(|err| BridgeError::Decode(err.to_string()))
    }
}
