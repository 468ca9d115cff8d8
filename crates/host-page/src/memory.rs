//! In-memory host document.
//!
//! Models the parts of a chat page the content script touches: a flat list of elements in
//! document order, the nodes the enhancer appends to `body`, and the signal stream a
//! `MutationObserver` plus focus/scroll listeners would produce. Used by the integration tests
//! and the `demo` command.

use std::collections::BTreeMap;
use std::sync::Arc;

use enhancer_core_types::{
    ControlId, ElementId, ElementKind, NotificationId, NotificationKind, ReadyState, Rect,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use crate::selector::Selector;
use crate::{ControlPatch, ControlPosition, ControlSpec, DomEvent, HostPage, PageSignal};

/// Description of an element to render into the document.
#[derive(Clone, Debug, Default)]
pub struct NodeSpec {
    tag: String,
    attributes: BTreeMap<String, String>,
    rect: Rect,
    value: String,
    text: String,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControlSnapshot {
    pub id: ControlId,
    pub dom_id: String,
    pub label: String,
    pub title: String,
    pub disabled: bool,
    pub visible: bool,
    pub position: Option<ControlPosition>,
    pub hovered: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NotificationSnapshot {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub class_name: String,
}

#[derive(Debug)]
struct Node {
    id: ElementId,
    spec: NodeSpec,
    events: Vec<DomEvent>,
}

impl Node {
    fn kind(&self) -> Option<ElementKind> {
        match self.spec.tag.as_str() {
            "textarea" | "input" => Some(ElementKind::PlainInput),
            _ => match self.spec.attributes.get("contenteditable").map(String::as_str) {
                Some("true") | Some("") => Some(ElementKind::RichEditable),
                _ => None,
            },
        }
    }
}

#[derive(Debug)]
struct Document {
    ready_state: ReadyState,
    nodes: Vec<Node>,
    controls: Vec<ControlSnapshot>,
    notifications: Vec<NotificationSnapshot>,
    next_id: u64,
}

impl Document {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    fn control_mut(&mut self, id: ControlId) -> Option<&mut ControlSnapshot> {
        self.controls.iter_mut().find(|control| control.id == id)
    }
}

pub struct InMemoryPage {
    doc: Mutex<Document>,
    signals: mpsc::UnboundedSender<PageSignal>,
}

impl InMemoryPage {
    /// Creates an empty document and the receiving end of its signal stream.
    pub fn new(ready_state: ReadyState) -> (Arc<Self>, mpsc::UnboundedReceiver<PageSignal>) {
        let (signals, rx) = mpsc::unbounded_channel();
        let page = Arc::new(Self {
            doc: Mutex::new(Document {
                ready_state,
                nodes: Vec::new(),
                controls: Vec::new(),
                notifications: Vec::new(),
                next_id: 0,
            }),
            signals,
        });
        (page, rx)
    }

    fn emit(&self, signal: PageSignal) {
        if self.signals.send(signal).is_err() {
            debug!(?signal, "page signal dropped; no observer attached");
        }
    }

    /// Renders a new element at the end of the document.
    pub fn insert(&self, spec: NodeSpec) -> ElementId {
        let id = {
            let mut doc = self.doc.lock();
            let id = ElementId(doc.allocate());
            doc.nodes.push(Node {
                id,
                spec,
                events: Vec::new(),
            });
            id
        };
        self.emit(PageSignal::Mutation);
        id
    }

    pub fn remove(&self, element: ElementId) -> bool {
        let removed = {
            let mut doc = self.doc.lock();
            let before = doc.nodes.len();
            doc.nodes.retain(|node| node.id != element);
            doc.nodes.len() != before
        };
        if removed {
            self.emit(PageSignal::Mutation);
        }
        removed
    }

    /// Re-renders `element` in place: same document position, new identity.
    pub fn replace(&self, element: ElementId, spec: NodeSpec) -> Option<ElementId> {
        let id = {
            let mut doc = self.doc.lock();
            let position = doc.nodes.iter().position(|node| node.id == element)?;
            let id = ElementId(doc.allocate());
            doc.nodes[position] = Node {
                id,
                spec,
                events: Vec::new(),
            };
            id
        };
        self.emit(PageSignal::Mutation);
        Some(id)
    }

    /// Layout change; style updates are not childList mutations, so no signal is emitted.
    pub fn set_rect(&self, element: ElementId, rect: Rect) -> bool {
        match self.doc.lock().node_mut(element) {
            Some(node) => {
                node.spec.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Simulates the user typing into an input surface.
    pub fn type_text(&self, element: ElementId, text: &str) -> bool {
        let mut doc = self.doc.lock();
        let Some(node) = doc.node_mut(element) else {
            return false;
        };
        match node.kind() {
            Some(ElementKind::PlainInput) => node.spec.value = text.to_string(),
            _ => node.spec.text = text.to_string(),
        }
        true
    }

    pub fn finish_loading(&self) {
        self.doc.lock().ready_state = ReadyState::Complete;
        self.emit(PageSignal::Loaded);
    }

    pub fn scroll(&self) {
        self.emit(PageSignal::Scroll);
    }

    pub fn focus(&self, element: ElementId) {
        self.emit(PageSignal::Focus(element));
    }

    pub fn blur(&self, element: ElementId) {
        self.emit(PageSignal::Blur(element));
    }

    pub fn hover_control(&self, control: ControlId, hovered: bool) {
        if let Some(snapshot) = self.doc.lock().control_mut(control) {
            snapshot.hovered = hovered;
        }
    }

    /// Clicks the control. Disabled or detached controls swallow the click.
    pub fn click_control(&self, control: ControlId) -> bool {
        let clickable = self
            .doc
            .lock()
            .controls
            .iter()
            .any(|snapshot| snapshot.id == control && !snapshot.disabled);
        if clickable {
            self.emit(PageSignal::ControlActivated(control));
        }
        clickable
    }

    pub fn controls(&self) -> Vec<ControlSnapshot> {
        self.doc.lock().controls.clone()
    }

    pub fn control(&self, control: ControlId) -> Option<ControlSnapshot> {
        self.doc
            .lock()
            .controls
            .iter()
            .find(|snapshot| snapshot.id == control)
            .cloned()
    }

    pub fn notifications(&self) -> Vec<NotificationSnapshot> {
        self.doc.lock().notifications.clone()
    }

    pub fn dispatched_events(&self, element: ElementId) -> Vec<DomEvent> {
        self.doc
            .lock()
            .node(element)
            .map(|node| node.events.clone())
            .unwrap_or_default()
    }
}

impl HostPage for InMemoryPage {
    fn ready_state(&self) -> ReadyState {
        self.doc.lock().ready_state
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(err) => {
                debug!(%err, "selector matches nothing");
                return Vec::new();
            }
        };
        self.doc
            .lock()
            .nodes
            .iter()
            .filter(|node| selector.matches(&node.spec.tag, &node.spec.attributes))
            .map(|node| node.id)
            .collect()
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.doc.lock().node(element).map(|node| node.spec.rect)
    }

    fn element_kind(&self, element: ElementId) -> Option<ElementKind> {
        self.doc.lock().node(element).and_then(Node::kind)
    }

    fn value(&self, element: ElementId) -> Option<String> {
        let doc = self.doc.lock();
        let node = doc.node(element)?;
        match node.kind() {
            Some(ElementKind::PlainInput) => Some(node.spec.value.clone()),
            _ => None,
        }
    }

    fn set_value(&self, element: ElementId, value: &str) -> bool {
        let mut doc = self.doc.lock();
        match doc.node_mut(element) {
            Some(node) if node.kind() == Some(ElementKind::PlainInput) => {
                node.spec.value = value.to_string();
                true
            }
            _ => false,
        }
    }

    fn text_content(&self, element: ElementId) -> Option<String> {
        self.doc
            .lock()
            .node(element)
            .map(|node| node.spec.text.clone())
    }

    fn set_text_content(&self, element: ElementId, text: &str) -> bool {
        match self.doc.lock().node_mut(element) {
            Some(node) => {
                node.spec.text = text.to_string();
                true
            }
            None => false,
        }
    }

    fn dispatch_event(&self, element: ElementId, event: DomEvent) {
        if let Some(node) = self.doc.lock().node_mut(element) {
            node.events.push(event);
        }
    }

    fn append_control(&self, spec: &ControlSpec) -> ControlId {
        let id = {
            let mut doc = self.doc.lock();
            let id = ControlId(doc.allocate());
            doc.controls.push(ControlSnapshot {
                id,
                dom_id: spec.dom_id.clone(),
                label: spec.label.clone(),
                title: spec.title.clone(),
                disabled: spec.disabled,
                visible: true,
                position: None,
                hovered: false,
            });
            id
        };
        self.emit(PageSignal::Mutation);
        id
    }

    fn update_control(&self, control: ControlId, patch: &ControlPatch) {
        let mut doc = self.doc.lock();
        let Some(snapshot) = doc.control_mut(control) else {
            return;
        };
        if let Some(position) = patch.position {
            snapshot.position = Some(position);
        }
        if let Some(visible) = patch.visible {
            snapshot.visible = visible;
        }
        if let Some(label) = &patch.label {
            snapshot.label = label.clone();
        }
        if let Some(disabled) = patch.disabled {
            snapshot.disabled = disabled;
        }
    }

    fn remove_control(&self, control: ControlId) {
        let removed = {
            let mut doc = self.doc.lock();
            let before = doc.controls.len();
            doc.controls.retain(|snapshot| snapshot.id != control);
            doc.controls.len() != before
        };
        if removed {
            self.emit(PageSignal::Mutation);
        }
    }

    fn is_control_hovered(&self, control: ControlId) -> bool {
        self.doc
            .lock()
            .controls
            .iter()
            .any(|snapshot| snapshot.id == control && snapshot.hovered)
    }

    fn append_notification(&self, message: &str, kind: NotificationKind) -> NotificationId {
        let id = {
            let mut doc = self.doc.lock();
            let id = NotificationId(doc.allocate());
            doc.notifications.push(NotificationSnapshot {
                id,
                message: message.to_string(),
                kind,
                class_name: kind.class_name(),
            });
            id
        };
        self.emit(PageSignal::Mutation);
        id
    }

    fn remove_notification(&self, notification: NotificationId) {
        let removed = {
            let mut doc = self.doc.lock();
            let before = doc.notifications.len();
            doc.notifications.retain(|entry| entry.id != notification);
            doc.notifications.len() != before
        };
        if removed {
            self.emit(PageSignal::Mutation);
        }
    }
}
