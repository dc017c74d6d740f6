//! Health command implementation.

use anyhow::Context;
use colored::Colorize;
use fcp_core::{Config, FcpClient};

/// Execute the health command.
pub async fn execute() -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = FcpClient::new(&config).context("Failed to build FCP client")?;

    let response = client
        .health_check()
        .await
        .with_context(|| format!("FCP server at {} is unreachable", config.server_url))?;

    let status = response["status"].as_str().unwrap_or("unknown");
    println!("{} Server is {} ({})", "✓".green(), status.cyan(), config.server_url);
    Ok(())
}
