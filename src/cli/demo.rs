use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use enhancer_core_types::{ReadyState, Rect};
use extensions_bridge::channel::DEFAULT_CHANNEL_CAPACITY;
use extensions_bridge::{runtime_channel, BackgroundResponder, BridgeState, HttpEnhancementService};
use host_page::{HostPage, InMemoryPage, NodeSpec};
use tokio::time::{sleep, timeout};
use tracing::info;

use crate::config::Config;
use crate::content_script::ContentScript;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Args, Clone, Debug)]
pub struct DemoArgs {
    /// Text typed into the chat input before activating the control
    #[arg(long, default_value = "write a haiku about rust")]
    pub prompt: String,

    /// Seconds to wait for the control to appear and for the round trip to finish
    #[arg(long, default_value_t = 30)]
    pub wait: u64,
}

/// Renders a chat input on an in-memory page, lets the content script find it, and presses
/// the enhance control once.
pub async fn cmd_demo(args: DemoArgs, config: &Config) -> Result<()> {
    let limit = Duration::from_secs(args.wait);
    let settings = config.page_settings()?;
    let service = HttpEnhancementService::new(config.endpoint()?)?;

    let (channel, inbox) = runtime_channel(DEFAULT_CHANNEL_CAPACITY);
    let background = tokio::spawn(BackgroundResponder::new(Arc::new(service)).run(inbox));

    let (page, signals) = InMemoryPage::new(ReadyState::Loading);
    let script = ContentScript::new(page.clone(), settings, Arc::new(channel));
    let handle = script.handle();
    let content_script = script.spawn(signals);

    page.finish_loading();
    let input = page.insert(
        NodeSpec::new("textarea")
            .attr("id", "prompt-textarea")
            .attr("placeholder", "Message ChatGPT")
            .rect(Rect::new(600.0, 80.0, 700.0, 52.0)),
    );

    wait_until(limit, "the enhance control", || handle.control().is_some()).await?;
    let control = handle.control().context("Enhance control disappeared")?;
    info!(%input, %control, "control mounted");

    page.type_text(input, &args.prompt);
    page.focus(input);
    page.click_control(control);

    wait_until(limit, "the enhancement round trip", || {
        !page.notifications().is_empty() && handle.bridge_state() == BridgeState::Idle
    })
    .await?;

    println!("input: {}", page.value(input).unwrap_or_default());
    for note in page.notifications() {
        println!("[{}] {}", note.kind.name(), note.message);
    }

    content_script.abort();
    background.abort();
    Ok(())
}

async fn wait_until<F>(limit: Duration, what: &str, mut ready: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    timeout(limit, async {
        while !ready() {
            sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .with_context(|| format!("Timed out waiting for {what}"))
}
