pub mod app;
pub mod commands;
pub mod demo;
pub mod dispatch;
pub mod enhance;
pub mod env;
pub mod runtime;
pub mod status;

pub use demo::{cmd_demo, DemoArgs};
pub use enhance::{cmd_enhance, EnhanceArgs};
pub use status::cmd_status;
