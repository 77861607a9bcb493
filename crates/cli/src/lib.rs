//! # calsync-cli
//!
//! Command-line interface for the work-order calendar reconciliation.
//!
//! ## Commands
//!
//! - `calsync run` - Reconcile once, from the stored checkpoint or `--since`
//! - `calsync schedule` - Reconcile on a cron schedule until interrupted
//!
//! ## Configuration
//!
//! Connection settings come from the environment (a `.env` file is honoured)
//! or from a JSON/TOML file passed with `--config`. See
//! `calsync_infra::config::loader` for the variable names.

// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod commands;
pub mod context;
pub mod logging;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use calsync_domain::Config;
use clap::{Parser, Subcommand};

/// calsync - keep the service calendar in step with Qualer work orders.
#[derive(Debug, Parser)]
#[command(name = "calsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or TOML). Defaults to environment variables.
    #[arg(long, global = true, env = "CALSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run log written alongside stderr output.
    #[arg(long, global = true, env = "CALSYNC_LOG_FILE", default_value = "app/calsync.log")]
    pub log_file: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no source yields a valid configuration.
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => calsync_infra::config::load_from_file(Some(path.clone())),
            None => calsync_infra::config::load(),
        };
        config.context("Failed to load configuration")
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile once and exit.
    Run(commands::run::RunArgs),
    /// Reconcile on a cron schedule until Ctrl-C.
    Schedule(commands::schedule::ScheduleArgs),
}
