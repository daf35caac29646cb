// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt - validate provisioning scripts across Vagrant boxes

mod color;
mod commands;
mod env;
mod exit_error;
mod logging;
mod output;
mod table;

use output::OutputFormat;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{destroy, up};

#[derive(Parser)]
#[command(
    name = "vt",
    version,
    about = "Validate a provisioning script across Vagrant boxes"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring up each box, run the script in it, and report per box
    Up(up::UpArgs),
    /// Tear down boxes and remove workspaces left by an earlier run
    Destroy(destroy::DestroyArgs),
}

impl Commands {
    fn debug(&self) -> bool {
        match self {
            Commands::Up(args) => args.debug,
            Commands::Destroy(args) => args.debug,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, the
/// "Caused by" chain is skipped (common with thiserror variants that
/// embed `{source}`). Otherwise the full chain is rendered.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            // No subcommand provided: print help and exit 0
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
    };

    logging::init(command.debug());

    match command {
        Commands::Up(args) => up::handle(args, format).await,
        Commands::Destroy(args) => destroy::handle(args, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
