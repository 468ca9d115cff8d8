use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    prompt_enhancer_cli::cli::app::run().await
}
