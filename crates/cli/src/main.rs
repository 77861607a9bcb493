//! calsync CLI entry point.

use anyhow::Result;
use clap::Parser;

use calsync_cli::{commands, logging, Cli, Commands};

fn main() -> Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = logging::init(&cli.log_file)?;

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    let config = cli.load_config()?;

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Run(args) => commands::run::execute(args, config).await,
            Commands::Schedule(args) => commands::schedule::execute(args, config).await,
        }
    })
}
