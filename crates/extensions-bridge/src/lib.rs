//! Prompt enhancer extension bridge.
//!
//! The page-context script and the privileged background only talk through the extension's
//! runtime messaging channel. This crate provides both halves of that conversation:
//! - [`page::EnhanceController`]: the single-flight `Idle -> Requesting -> Idle` state machine
//!   that packages an activation into a request and applies the reply to the page.
//! - [`background::BackgroundResponder`]: a stateless responder that performs the outbound HTTP
//!   call and always answers with a value, never by failing across the boundary.
//!
//! Envelopes on the channel carry untyped JSON; [`messages`] holds the typed contract both
//! halves decode into.

pub mod background;
pub mod channel;
pub mod config;
pub mod messages;
pub mod page;
pub mod service;

pub use background::BackgroundResponder;
pub use channel::{runtime_channel, Envelope, RuntimeChannel, RuntimeInbox, RuntimeMessenger};
pub use config::ServiceEndpoint;
pub use messages::{EnhancementRequest, EnhancementResult, ReplyPayload, RuntimeMessage};
pub use page::{Activation, BridgeState, EnhanceController, PromptSurface};
pub use service::{
    check_health, EnhancementService, HealthStatus, HttpEnhancementService, ServiceError,
};

use thiserror::Error;

/// Messaging-channel failures, as seen by the page half.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("background is not listening")]
    ChannelClosed,
    #[error("message port closed before a response was received")]
    NoReply,
    #[error("could not encode message: {0}")]
    Encode(String),
    #[error("could not decode reply: {0}")]
    Decode(String),
}
