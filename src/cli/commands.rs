use clap::Subcommand;

use super::demo::DemoArgs;
use super::enhance::EnhanceArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Check whether the enhancement service is reachable
    Status,

    /// Enhance one prompt through the background bridge
    Enhance(EnhanceArgs),

    /// Drive the content script against an in-memory chat page
    Demo(DemoArgs),
}
