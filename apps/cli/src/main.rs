//! FCP CLI - Command-line client for the FCP food-data server.
//!
//! Provides an `fcp` command that forwards meal logging and related
//! operations to a remote FCP server over HTTP.

mod commands;
mod render;

use clap::{Parser, Subcommand};
use commands::log::LogAction;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// FCP CLI - Log and analyze food data from the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "fcp",
    author,
    version,
    about = "FCP - command-line client for the FCP food-data server"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log meals, individually or in parallel batches
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Check FCP server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Log { action } => commands::log::execute(action).await,
        Command::Health => commands::health::execute().await,
    }
}
