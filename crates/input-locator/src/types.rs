//! Core types for the locator

use std::time::Duration;

use enhancer_core_types::{ElementId, ElementKind, Rect};
use host_page::ControlPosition;

pub const CONTROL_DOM_ID: &str = "ai-prompt-enhancer-btn";
pub const CONTROL_TITLE: &str = "Enhance this prompt with AI";
pub const IDLE_LABEL: &str = "✨ Enhance";
pub const BUSY_LABEL: &str = "⏳ Enhancing...";

/// The host page's prompt input surface.
///
/// Only a borrowed handle: the host owns the node and may re-render it away at any time.
/// Visibility is never cached; it is read from the live layout when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetElement {
    pub element: ElementId,
    pub kind: ElementKind,
}

impl TargetElement {
    pub fn new(element: ElementId, kind: ElementKind) -> Self {
        Self { element, kind }
    }

    /// Identity comparison; a re-rendered node is a different target.
    pub fn same_as(&self, other: &TargetElement) -> bool {
        self.element == other.element
    }
}

/// Where the control sits relative to the target's viewport rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Distance between the control's top edge and the target's top edge.
    pub offset_above: f64,
    /// Distance from the viewport's right edge.
    pub right: f64,
    pub z_index: i32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            offset_above: 45.0,
            right: 20.0,
            z_index: 10_000,
        }
    }
}

impl Placement {
    pub fn position_for(&self, rect: Rect) -> ControlPosition {
        ControlPosition {
            top: rect.top - self.offset_above,
            right: self.right,
            z_index: self.z_index,
        }
    }
}

/// Delays driving the observation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverTiming {
    /// Quiescence window after the last mutation before reconciling.
    pub debounce: Duration,
    /// One-shot reconcile delay when the document was already loaded at startup.
    pub initial_delay: Duration,
    /// How long a blurred target keeps its control visible.
    pub blur_grace: Duration,
}

impl Default for ObserverTiming {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            initial_delay: Duration::from_millis(1000),
            blur_grace: Duration::from_millis(100),
        }
    }
}
