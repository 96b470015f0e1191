//! Credential commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use octoplan_core::credential::{Capability, CapabilityClass, Credential};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Show the detected credential class and what it can do
    Status,
}

pub async fn execute(cmd: AuthCommands, credential: Credential) -> Result<()> {
    match cmd {
        AuthCommands::Status => print_auth_status(&credential),
    }

    Ok(())
}

fn print_auth_status(credential: &Credential) {
    println!();

    let class = match credential.class() {
        CapabilityClass::Full => "full".green().bold(),
        CapabilityClass::Restricted => "restricted".yellow().bold(),
        CapabilityClass::Unknown => "unknown".dimmed().bold(),
    };
    println!("{} Credential class: {}", "●".green().bold(), class);

    if let Some(diagnostic) = credential.diagnostic() {
        println!("  {} {}", "▸".yellow(), diagnostic);
    }

    println!();
    let graph = if credential.suitable_for(Capability::Graph) {
        "available".green()
    } else {
        "gated".red()
    };
    let rest = if credential.suitable_for(Capability::Rest) {
        "available".green()
    } else {
        "gated".red()
    };
    println!("  {} Project tools (GraphQL): {}", "▸".dimmed(), graph);
    println!("  {} Issue tools (REST):      {}", "▸".dimmed(), rest);
    println!();
}
