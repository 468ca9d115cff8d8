//! Prompt text access for the current target.

use enhancer_core_types::ElementKind;
use host_page::{DomEvent, HostPage};
use tracing::debug;

use crate::{errors::LocatorError, types::TargetElement};

/// Current prompt text: `value` for plain inputs, rendered text for editable regions.
/// A target that has been re-rendered away reads as empty.
pub fn read_text(page: &dyn HostPage, target: &TargetElement) -> String {
    let text = match target.kind {
        ElementKind::PlainInput => page.value(target.element),
        ElementKind::RichEditable => page.text_content(target.element),
    };
    text.unwrap_or_default()
}

/// Replaces the prompt text and fires the events the host framework listens for, so its own
/// state model picks up the edit.
pub fn write_text(
    page: &dyn HostPage,
    target: &TargetElement,
    text: &str,
) -> Result<(), LocatorError> {
    let written = match target.kind {
        ElementKind::PlainInput => page.set_value(target.element, text),
        ElementKind::RichEditable => page.set_text_content(target.element, text),
    };
    if !written {
        return Err(LocatorError::Detached(target.element));
    }

    page.dispatch_event(target.element, DomEvent::Input);
    if target.kind == ElementKind::PlainInput {
        page.dispatch_event(target.element, DomEvent::Change);
    }
    debug!(element = %target.element, chars = text.chars().count(), "prompt text replaced");
    Ok(())
}
