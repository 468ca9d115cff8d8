//! Page-context half of the bridge.

use std::sync::Arc;
use std::time::Duration;

use enhancer_core_types::{NotificationKind, RequestId};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    channel::RuntimeMessenger,
    messages::{EnhancementRequest, EnhancementResult, RuntimeMessage},
};

pub const EMPTY_PROMPT_MESSAGE: &str = "Please write a prompt first!";
pub const FAILURE_MESSAGE: &str = "Enhancement failed. Check backend.";

/// `Enhanced in {N}s! ✨`, with the round trip rounded to whole seconds.
pub fn success_message(elapsed: Duration) -> String {
    format!("Enhanced in {}s! ✨", elapsed.as_secs_f64().round() as u64)
}

/// What the controller needs from the page: the current target's text, the injected control's
/// busy state, and transient notifications.
pub trait PromptSurface: Send + Sync {
    /// `None` when no target is tracked.
    fn read_prompt(&self) -> Option<String>;

    /// Overwrites the target's text. `false` when the target is gone.
    fn write_prompt(&self, text: &str) -> bool;

    fn set_busy(&self, busy: bool);

    fn notify(&self, message: &str, kind: NotificationKind);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Requesting,
}

/// How one activation ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    /// A request was already in flight, or there was nothing to read.
    Ignored,
    EmptyPrompt,
    Enhanced { elapsed: Duration },
    Failed { reason: String },
}

/// Single-flight `Idle -> Requesting -> Idle` state machine.
pub struct EnhanceController {
    messenger: Arc<dyn RuntimeMessenger>,
    state: Mutex<BridgeState>,
}

impl EnhanceController {
    pub fn new(messenger: Arc<dyn RuntimeMessenger>) -> Self {
        Self {
            messenger,
            state: Mutex::new(BridgeState::Idle),
        }
    }

    pub fn state(&self) -> BridgeState {
        *self.state.lock()
    }

    pub fn is_requesting(&self) -> bool {
        self.state() == BridgeState::Requesting
    }

    /// Handles one activation of the control. Only the `Idle -> Requesting` transition starts a
    /// request; every way out of `Requesting` restores the control.
    pub async fn activate(&self, surface: &dyn PromptSurface) -> Activation {
        if self.is_requesting() {
            debug!("activation ignored, request already in flight");
            return Activation::Ignored;
        }
        let Some(text) = surface.read_prompt() else {
            return Activation::Ignored;
        };
        if text.trim().is_empty() {
            surface.notify(EMPTY_PROMPT_MESSAGE, NotificationKind::Warning);
            return Activation::EmptyPrompt;
        }
        let Some(_in_flight) = InFlight::begin(self, surface) else {
            return Activation::Ignored;
        };

        let request_id = RequestId::new();
        let started = Instant::now();
        let message = RuntimeMessage::from(EnhancementRequest::new(text));
        info!(request = %request_id, "requesting enhancement");

        let result = match self.messenger.send_message(request_id, &message).await {
            Ok(reply) => EnhancementResult::from(reply),
            Err(err) => EnhancementResult::Failed(err.to_string()),
        };

        match result {
            EnhancementResult::Enhanced(enhanced) if surface.write_prompt(&enhanced) => {
                let elapsed = started.elapsed();
                info!(request = %request_id, ?elapsed, "prompt enhanced");
                surface.notify(&success_message(elapsed), NotificationKind::Success);
                Activation::Enhanced { elapsed }
            }
            EnhancementResult::Enhanced(_) => {
                self.fail(surface, request_id, "prompt input disappeared".to_string())
            }
            EnhancementResult::Failed(reason) => self.fail(surface, request_id, reason),
        }
    }

    fn fail(&self, surface: &dyn PromptSurface, request_id: RequestId, reason: String) -> Activation {
        warn!(request = %request_id, %reason, "enhancement failed");
        surface.notify(FAILURE_MESSAGE, NotificationKind::Error);
        Activation::Failed { reason }
    }
}

/// Holds the controller in `Requesting`. Dropping it returns to `Idle` and re-enables the
/// control, whichever way the request ended.
struct InFlight<'a> {
    controller: &'a EnhanceController,
    surface: &'a dyn PromptSurface,
}

impl<'a> InFlight<'a> {
    fn begin(controller: &'a EnhanceController, surface: &'a dyn PromptSurface) -> Option<Self> {
        {
            let mut state = controller.state.lock();
            if *state == BridgeState::Requesting {
                return None;
            }
            *state = BridgeState::Requesting;
        }
        surface.set_busy(true);
        Some(Self {
            controller,
            surface,
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.controller.state.lock() = BridgeState::Idle;
        self.surface.set_busy(false);
    }
}
