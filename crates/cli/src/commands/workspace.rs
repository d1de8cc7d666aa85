// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hatch workspace` - workspace management commands

use clap::{Args, Subcommand};

use crate::client::HatchClient;
use crate::color;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Args)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Subcommand)]
pub enum WorkspaceCommand {
    /// Create a workspace from a template
    New {
        /// Display name for the new workspace
        repl_name: String,
        /// Template id to copy into the workspace's object storage prefix
        #[arg(long, default_value = "blank")]
        template: String,
    },
    /// List your workspaces
    List,
    /// Activate a workspace and wait for it to become reachable
    Activate {
        /// Workspace id
        id: String,
    },
    /// Deactivate a workspace's compute instance, keeping its files
    Deactivate {
        /// Workspace id
        id: String,
    },
    /// Permanently delete a workspace and its stored files
    Drop {
        /// Workspace id
        id: String,
    },
}

pub async fn handle(command: WorkspaceCommand, client: &HatchClient, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        WorkspaceCommand::New { repl_name, template } => {
            let workspace = client.create_workspace(&repl_name, &template).await?;
            format_or_json(format, &workspace, || {
                println!("{} {}", color::header("Created:"), workspace.id);
                println!("  {} {}", color::context("Name:"), workspace.name);
                println!("  {} {}", color::context("Template:"), workspace.template);
            })?;
        }
        WorkspaceCommand::List => {
            let workspaces = client.list_workspaces().await?;
            handle_list(format, &workspaces, "No workspaces", |items| {
                for w in items {
                    println!("{:<40} {:<24} {:<16} {}", w.id.to_string(), w.name, w.template, if w.active { "active" } else { "inactive" });
                }
            })?;
        }
        WorkspaceCommand::Activate { id } => {
            let outcome = client.activate(&id).await?;
            format_or_json(format, &outcome, || {
                println!("{} {}", color::header("Ready:"), outcome.repl_name);
            })?;
        }
        WorkspaceCommand::Deactivate { id } => {
            client.deactivate(&id).await?;
            println!("Deactivated {id}");
        }
        WorkspaceCommand::Drop { id } => {
            client.delete_workspace(&id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}
