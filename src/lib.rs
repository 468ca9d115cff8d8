//! Prompt enhancer library
//!
//! Exposes the content-script loop, configuration and CLI for the binary and integration tests.

pub mod cli;
pub mod config;
pub mod content_script;

pub use config::{Config, ConfigError};
pub use content_script::{ContentScript, ContentScriptHandle, PageSettings};
