//! Octoplan CLI - GitHub Projects tools over MCP.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

/// Initialize tracing with optional file logging.
///
/// When `mcp_mode` is true, all tracing output goes to stderr with ANSI
/// disabled to prevent corrupting the JSON-RPC protocol on stdout.
fn init_tracing(log_file: Option<&std::path::Path>, mcp_mode: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "octoplan=info,octoplan_mcp=debug".into());

    let file_layer = log_file.map(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Failed to open log file");

        tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
    });

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if mcp_mode {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mcp_mode = matches!(
        &cli.command,
        Commands::Mcp(commands::mcp::McpCommands::Stdio(_))
    );
    init_tracing(cli.log_file.as_deref(), mcp_mode);

    cli.execute().await
}
