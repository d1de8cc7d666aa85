// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hatch` - operator CLI over the Control Plane's `/api/repl` surface.

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use client::HatchClient;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "hatch", version, styles = color::styles())]
struct Cli {
    /// Control Plane base URL. Defaults to `HATCH_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session cookie value. Defaults to `HATCH_SESSION`.
    #[arg(long, global = true)]
    session: Option<String>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage workspaces
    Workspace(commands::workspace::WorkspaceArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        if let Some(exit) = err.downcast_ref::<ExitError>() {
            eprintln!("{}", exit.message);
            std::process::exit(exit.code);
        }
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let api_url = cli
        .api_url
        .or_else(|| std::env::var("HATCH_API_URL").ok())
        .ok_or_else(|| ExitError::new(2, "no Control Plane URL: pass --api-url or set HATCH_API_URL"))?;
    let session = cli
        .session
        .or_else(|| std::env::var("HATCH_SESSION").ok())
        .ok_or_else(|| ExitError::new(2, "no session: pass --session or set HATCH_SESSION"))?;

    let client = HatchClient::new(api_url, &session)?;

    match cli.command {
        Command::Workspace(args) => commands::workspace::handle(args.command, &client, cli.output).await?,
    }

    Ok(())
}
