//! Ordered selector resolution
//!
//! Selectors are tried strictly in priority order. Within one selector, matches are walked in
//! document order and the first visible input surface wins. There is no heuristic beyond the
//! chain: when nothing matches, the page simply has no target.

use host_page::{HostPage, Selector};
use tracing::{debug, trace};

use crate::{errors::LocatorError, types::TargetElement};

/// Selector chain for the chat page, most specific first.
pub const DEFAULT_SELECTORS: [&str; 5] = [
    r#"textarea[data-id="root"]"#,
    "#prompt-textarea",
    r#"textarea[placeholder*="Message"]"#,
    r#"div[contenteditable="true"][data-id="root"]"#,
    r#"div[contenteditable="true"]"#,
];

/// Validated, ordered list of candidate selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    selectors: Vec<String>,
}

impl SelectorChain {
    /// Build a chain, rejecting empty chains and selectors outside the supported subset.
    pub fn new<I, S>(selectors: I) -> Result<Self, LocatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selectors: Vec<String> = selectors.into_iter().map(Into::into).collect();
        if selectors.is_empty() {
            return Err(LocatorError::EmptyChain);
        }
        for selector in &selectors {
            Selector::parse(selector).map_err(|source| LocatorError::InvalidSelector {
                selector: selector.clone(),
                source,
            })?;
        }
        Ok(Self { selectors })
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Resolve the current target. Deterministic for a given document state.
    pub fn locate(&self, page: &dyn HostPage) -> Option<TargetElement> {
        for (priority, selector) in self.selectors.iter().enumerate() {
            for element in page.query_selector_all(selector) {
                let visible = page
                    .bounding_rect(element)
                    .map(|rect| rect.is_visible())
                    .unwrap_or(false);
                if !visible {
                    trace!(%element, selector = selector.as_str(), "skipping zero-size match");
                    continue;
                }
                let Some(kind) = page.element_kind(element) else {
                    trace!(%element, selector = selector.as_str(), "match is not an input surface");
                    continue;
                };
                debug!(
                    %element,
                    kind = kind.name(),
                    priority,
                    selector = selector.as_str(),
                    "located prompt input"
                );
                return Some(TargetElement::new(element, kind));
            }
        }
        None
    }
}

impl Default for SelectorChain {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
