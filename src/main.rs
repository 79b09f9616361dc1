mod cli;
mod commands;
mod mcp;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Report lines go to stdout; keep diagnostics on stderr.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let completed = match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server().await?;
            true
        }
        Some(Commands::List { path, json }) => {
            commands::list::run(&path, json)?;
            true
        }
        Some(Commands::Toc { path }) => {
            commands::toc::run(&path)?;
            true
        }
        None => match cli.path {
            Some(path) => commands::split::run(&path, cli.chapters.as_deref())?,
            None => {
                let stdin = std::io::stdin();
                commands::interactive::run(stdin.lock(), std::io::stdout())?
            }
        },
    };

    Ok(if completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
