use super::demo::cmd_demo;
use super::enhance::cmd_enhance;
use super::env::CliArgs;
use super::status::cmd_status;
use crate::cli::commands::Commands;
use crate::config::Config;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, config: &Config) -> Result<()> {
    match cli.command.clone() {
        Commands::Status => cmd_status(config).await,
        Commands::Enhance(args) => cmd_enhance(args, config).await,
        Commands::Demo(args) => cmd_demo(args, config).await,
    }
}
