//! Prompt input locator & control injector
//!
//! Keeps exactly one enhance control attached next to the host page's prompt input:
//! - Ordered selector chain resolution, first visible match wins
//! - Identity-based reconciliation (`NoTarget` / `HasTarget`) with destroy-and-recreate on change
//! - Quiescence debouncing so mutation storms collapse into a single reconcile
//! - Kind-aware prompt reads and framework-friendly writes

pub mod debounce;
pub mod errors;
pub mod injector;
pub mod strategies;
pub mod text;
pub mod types;

pub use debounce::*;
pub use errors::*;
pub use injector::*;
pub use strategies::*;
pub use text::*;
pub use types::*;
