use std::fmt;

use uuid::Uuid;

/// Identity of a host-owned element. Two handles refer to the same node iff they are equal;
/// a node the host re-renders away comes back under a fresh id.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Identity of the injected enhance control.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u64);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

/// Correlates one enhancement round trip across the page and background logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Viewport rectangle, as reported by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Zero-size rectangles belong to elements the host keeps in the DOM but hides.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// How the prompt text is stored on an input surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ElementKind {
    /// `textarea` / `input`: text lives in `value`.
    PlainInput,
    /// `contenteditable="true"`: text lives in the rendered content.
    RichEditable,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::PlainInput => "plain-input",
            ElementKind::RichEditable => "rich-editable",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn name(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }

    /// Class list applied to the notification node.
    pub fn class_name(&self) -> String {
        format!("ai-enhancer-notification {}", self.name())
    }
}

/// `document.readyState` at the moment the content script starts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ReadyState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_rect_is_hidden() {
        assert!(Rect::new(10.0, 10.0, 300.0, 40.0).is_visible());
        assert!(!Rect::new(10.0, 10.0, 0.0, 40.0).is_visible());
        assert!(!Rect::new(10.0, 10.0, 300.0, 0.0).is_visible());
        assert!(!Rect::default().is_visible());
    }

    #[test]
    fn notification_class_carries_kind() {
        assert_eq!(
            NotificationKind::Warning.class_name(),
            "ai-enhancer-notification warning"
        );
        assert_eq!(NotificationKind::Error.name(), "error");
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
