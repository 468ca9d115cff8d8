//! Typed contract for the runtime messaging channel and the enhancement service.
//!
//! Request: `{"action": "enhancePrompt", "prompt": "..."}`.
//! Reply: `{"enhanced": "..."}` on success or `{"error": "..."}` on failure.

use serde::{Deserialize, Serialize};

pub const ENHANCE_PROMPT_ACTION: &str = "enhancePrompt";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum RuntimeMessage {
    #[serde(rename = "enhancePrompt")]
    EnhancePrompt { prompt: String },
}

/// One activation's worth of prompt text. Immutable for the length of a round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnhancementRequest {
    prompt: String,
}

impl EnhancementRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

impl From<EnhancementRequest> for RuntimeMessage {
    fn from(request: EnhancementRequest) -> Self {
        RuntimeMessage::EnhancePrompt {
            prompt: request.prompt,
        }
    }
}

/// Reply as it travels on the channel. Decoding is lenient so that a reply carrying both
/// fields, or neither, can still be classified.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one enhancement round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnhancementResult {
    Enhanced(String),
    Failed(String),
}

impl EnhancementResult {
    pub fn is_enhanced(&self) -> bool {
        matches!(self, EnhancementResult::Enhanced(_))
    }

    pub fn into_payload(self) -> ReplyPayload {
        match self {
            EnhancementResult::Enhanced(text) => ReplyPayload {
                enhanced: Some(text),
                error: None,
            },
            EnhancementResult::Failed(reason) => ReplyPayload {
                enhanced: None,
                error: Some(reason),
            },
        }
    }
}

impl From<ReplyPayload> for EnhancementResult {
    fn from(payload: ReplyPayload) -> Self {
        match payload {
            ReplyPayload {
                error: Some(reason),
                ..
            } => EnhancementResult::Failed(reason),
            ReplyPayload {
                enhanced: Some(text),
                ..
            } if !text.is_empty() => EnhancementResult::Enhanced(text),
            ReplyPayload {
                enhanced: Some(_), ..
            } => EnhancementResult::Failed("service returned empty text".to_string()),
            ReplyPayload { .. } => {
                EnhancementResult::Failed("reply carried neither text nor error".to_string())
            }
        }
    }
}

/// `POST /enhance-prompt` body.
#[derive(Clone, Debug, Serialize)]
pub struct EnhanceRequestBody<'a> {
    pub prompt: &'a str,
}

/// `POST /enhance-prompt` success body.
#[derive(Clone, Debug, Deserialize)]
pub struct EnhanceResponseBody {
    pub enhanced: String,
}
