//! MCP server commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use octoplan_core::credential::{CapabilityClass, Credential};
use octoplan_mcp::{AppContext, AuditLog};

/// Number of tools available in the MCP server.
const MCP_TOOLS_COUNT: usize = 16;

#[derive(Subcommand)]
pub enum McpCommands {
    /// Run MCP server over stdio
    Stdio(StdioArgs),

    /// Show MCP server status and available tools
    Status,
}

#[derive(Args)]
pub struct StdioArgs {
    /// Append a JSONL audit entry for every tool call to this file
    #[arg(long)]
    pub audit_log: Option<PathBuf>,

    /// GraphQL endpoint override
    #[arg(long, env = "GITHUB_GRAPHQL_URL", hide = true)]
    pub graphql_url: Option<String>,

    /// REST endpoint override
    #[arg(long, env = "GITHUB_API_URL", hide = true)]
    pub api_url: Option<String>,
}

pub async fn execute(cmd: McpCommands, credential: Credential) -> Result<()> {
    match cmd {
        McpCommands::Stdio(args) => {
            eprintln!(
                "  {} {} {}",
                "●".green().bold(),
                "octoplan".cyan().bold(),
                "MCP server running (stdio)".bold()
            );
            eprintln!("  {} {} tools", "▸".dimmed(), MCP_TOOLS_COUNT);
            if credential.class() == CapabilityClass::Restricted {
                eprintln!(
                    "  {} {}",
                    "▸".yellow(),
                    "restricted token: project tools are gated, issue tools work"
                );
            }
            eprintln!("  {} Ctrl+C to stop", "▸".dimmed());
            eprintln!();

            let audit = match &args.audit_log {
                Some(path) => Some(AuditLog::new(path)?),
                None => None,
            };

            let ctx = AppContext::new(credential, audit)
                .with_endpoints(args.graphql_url, args.api_url);
            octoplan_mcp::run_stdio_server(Arc::new(ctx)).await?;
        }

        McpCommands::Status => {
            print_mcp_status();
        }
    }

    Ok(())
}

fn print_mcp_status() {
    println!();
    println!("{} octoplan MCP Server Status", "●".green().bold());
    println!();
    println!(
        "  {} {} tools",
        "▸".dimmed(),
        MCP_TOOLS_COUNT.to_string().cyan().bold()
    );
    println!();

    println!("{}", "  Tools".bold().underline());
    println!();

    println!("  {} {}", "Projects".yellow(), "(4)".dimmed());
    println!("    {} {}", "list_projects".cyan(), "List projects of an org or user".dimmed());
    println!("    {} {}", "get_project".cyan(), "Get by owner and number".dimmed());
    println!("    {} {}", "get_project_fields".cyan(), "Fields with options/iterations".dimmed());
    println!("    {} {}", "get_project_views".cyan(), "Project views".dimmed());
    println!();

    println!("  {} {}", "Items".yellow(), "(7)".dimmed());
    println!("    {} {}", "get_project_items".cyan(), "Items with content".dimmed());
    println!("    {} {}", "add_item_to_project".cyan(), "Attach issue/PR by node id".dimmed());
    println!("    {} {}", "add_draft_issue".cyan(), "Add a draft".dimmed());
    println!("    {} {}", "update_project_item_field".cyan(), "Set a field by name".dimmed());
    println!("    {} {}", "delete_project_item".cyan(), "Remove an item".dimmed());
    println!("    {} {}", "add_issues_to_project".cyan(), "Bulk add by issue number".dimmed());
    println!("    {} {}", "bulk_update_issue_status".cyan(), "Bulk status move".dimmed());
    println!();

    println!("  {} {}", "Issues".yellow(), "(5)".dimmed());
    println!("    {} {}", "create_issue".cyan(), "Create".dimmed());
    println!("    {} {}", "list_issues".cyan(), "List (filterable)".dimmed());
    println!("    {} {}", "get_issue".cyan(), "Get by number".dimmed());
    println!("    {} {}", "add_issue_comment".cyan(), "Comment".dimmed());
    println!("    {} {}", "update_issue_state".cyan(), "Open/close".dimmed());
    println!();

    println!("{}", "  Configuration".bold().underline());
    println!();
    println!("  {} Claude Code (.mcp.json):", "▸".dimmed());
    println!();
    println!(
        r#"  {{
    "mcpServers": {{
      "octoplan": {{
        "command": "octoplan",
        "args": ["mcp", "stdio"],
        "env": {{ "GITHUB_TOKEN": "ghp_..." }}
      }}
    }}
  }}"#
    );
    println!();
}
