use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use enhancer_core_types::RequestId;
use extensions_bridge::channel::DEFAULT_CHANNEL_CAPACITY;
use extensions_bridge::page::{EMPTY_PROMPT_MESSAGE, FAILURE_MESSAGE};
use extensions_bridge::{
    runtime_channel, BackgroundResponder, EnhancementRequest, EnhancementResult,
    HttpEnhancementService, RuntimeMessage, RuntimeMessenger,
};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct EnhanceArgs {
    /// Prompt text; read from stdin when omitted
    pub prompt: Option<String>,
}

pub async fn cmd_enhance(args: EnhanceArgs, config: &Config) -> Result<()> {
    let prompt = match args.prompt {
        Some(prompt) => prompt,
        None => read_stdin().await?,
    };
    if prompt.trim().is_empty() {
        bail!(EMPTY_PROMPT_MESSAGE);
    }

    let service = HttpEnhancementService::new(config.endpoint()?)?;
    let (channel, inbox) = runtime_channel(DEFAULT_CHANNEL_CAPACITY);
    let background = tokio::spawn(BackgroundResponder::new(Arc::new(service)).run(inbox));

    let request_id = RequestId::new();
    info!(request = %request_id, "sending prompt to background");
    let reply = channel
        .send_message(
            request_id,
            &RuntimeMessage::from(EnhancementRequest::new(prompt)),
        )
        .await
        .context("Runtime channel failed")?;
    drop(channel);
    background.await.context("Background task panicked")?;

    match EnhancementResult::from(reply) {
        EnhancementResult::Enhanced(text) => {
            println!("{text}");
            Ok(())
        }
        EnhancementResult::Failed(reason) => bail!("{FAILURE_MESSAGE} ({reason})"),
    }
}

async fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buffer)
        .await
        .context("Failed to read prompt from stdin")?;
    Ok(buffer.trim_end().to_string())
}
