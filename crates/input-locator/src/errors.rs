//! Error types for the locator

use enhancer_core_types::ElementId;
use host_page::SelectorError;
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// The selector chain has no entries
    #[error("selector chain is empty")]
    EmptyChain,

    /// A configured selector is outside the supported subset
    #[error("invalid selector '{selector}': {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    /// The host re-rendered the element away before we could touch it
    #[error("{0} is no longer attached to the document")]
    Detached(ElementId),
}
