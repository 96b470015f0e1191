//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use octoplan_core::credential::Credential;

pub mod auth;
pub mod mcp;

/// Octoplan - GitHub Projects tools over MCP
#[derive(Parser)]
#[command(name = "octoplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// GitHub token (classic or fine-grained personal access token)
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Write logs to this file in addition to the console
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// MCP server commands
    #[command(subcommand)]
    Mcp(mcp::McpCommands),

    /// Credential commands
    #[command(subcommand)]
    Auth(auth::AuthCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        // The one place the credential is read and classified; everything
        // downstream receives it by parameter.
        let credential = Credential::classify(self.token.as_deref());

        match self.command {
            Commands::Mcp(cmd) => mcp::execute(cmd, credential).await,
            Commands::Auth(cmd) => auth::execute(cmd, credential).await,
        }
    }
}
