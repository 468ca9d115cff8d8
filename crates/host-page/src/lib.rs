//! Host document seam.
//!
//! The chat page owns its DOM; the content script only ever borrows element handles through
//! [`HostPage`] and learns about changes through the [`PageSignal`] stream. Everything the page
//! side does to the document (reading the prompt, placing the control, showing notifications)
//! goes through this trait so the locator and bridge stay independent of the real host.

pub mod memory;
pub mod notify;
pub mod selector;

pub use memory::{ControlSnapshot, InMemoryPage, NodeSpec, NotificationSnapshot};
pub use notify::Notifier;
pub use selector::{Selector, SelectorError};

use enhancer_core_types::{
    ControlId, ElementId, ElementKind, NotificationId, NotificationKind, ReadyState, Rect,
};

/// Synthetic events the host framework listens for after a programmatic edit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DomEvent {
    Input,
    Change,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
        }
    }
}

/// Notifications delivered to the content script by the host document.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageSignal {
    /// `DOMContentLoaded`.
    Loaded,
    /// A childList change somewhere under `document.body`.
    Mutation,
    Scroll,
    Focus(ElementId),
    Blur(ElementId),
    /// A click on the injected control that was not swallowed by `disabled`.
    ControlActivated(ControlId),
}

/// Fixed-position placement of the control, in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPosition {
    pub top: f64,
    pub right: f64,
    pub z_index: i32,
}

/// Static attributes of a freshly created control.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSpec {
    pub dom_id: String,
    pub label: String,
    pub title: String,
    pub disabled: bool,
}

/// Partial update applied to a mounted control; `None` fields are left as they are.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlPatch {
    pub position: Option<ControlPosition>,
    pub visible: Option<bool>,
    pub label: Option<String>,
    pub disabled: Option<bool>,
}

impl ControlPatch {
    pub fn show_at(position: ControlPosition) -> Self {
        Self {
            position: Some(position),
            visible: Some(true),
            ..Self::default()
        }
    }

    pub fn hide() -> Self {
        Self {
            visible: Some(false),
            ..Self::default()
        }
    }

    pub fn busy_state(label: impl Into<String>, disabled: bool) -> Self {
        Self {
            label: Some(label.into()),
            disabled: Some(disabled),
            ..Self::default()
        }
    }
}

/// Synchronous view of the host document.
///
/// Element handles are never owned: any call may find that the host has re-rendered the node
/// away, in which case getters return `None` and setters return `false`.
pub trait HostPage: Send + Sync {
    fn ready_state(&self) -> ReadyState;

    /// All matches for `selector`, in document order. Unparseable selectors match nothing.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementId>;

    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// `None` for elements that are neither form inputs nor editable regions.
    fn element_kind(&self, element: ElementId) -> Option<ElementKind>;

    fn value(&self, element: ElementId) -> Option<String>;

    fn set_value(&self, element: ElementId, value: &str) -> bool;

    fn text_content(&self, element: ElementId) -> Option<String>;

    fn set_text_content(&self, element: ElementId, text: &str) -> bool;

    /// Dispatches a bubbling event of the given type on `element`.
    fn dispatch_event(&self, element: ElementId, event: DomEvent);

    /// Appends a new control to `document.body`.
    fn append_control(&self, spec: &ControlSpec) -> ControlId;

    fn update_control(&self, control: ControlId, patch: &ControlPatch);

    fn remove_control(&self, control: ControlId);

    /// `:hover` on the control.
    fn is_control_hovered(&self, control: ControlId) -> bool;

    fn append_notification(&self, message: &str, kind: NotificationKind) -> NotificationId;

    fn remove_notification(&self, notification: NotificationId);
}
