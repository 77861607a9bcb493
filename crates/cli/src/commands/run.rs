//! Run command - reconcile once and exit.

use anyhow::{bail, Context, Result};
use calsync_domain::Config;
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use tracing::warn;

use crate::context::AppContext;

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Start from this date (YYYY-MM-DD) instead of the stored checkpoint.
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Compute outcomes without writing to the calendar.
    #[arg(long, env = "CALSYNC_DRY_RUN")]
    pub dry_run: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the run cannot start (no checkpoint, calendar
/// unreachable) or if any window could not be fetched.
pub async fn execute(args: RunArgs, mut config: Config) -> Result<()> {
    config.sync.dry_run |= args.dry_run;
    let context = AppContext::new(config).context("Failed to initialise calsync")?;

    let summary = match args.since {
        Some(day) => context.service.run_from(day.and_time(NaiveTime::MIN)).await,
        None => context.service.run().await,
    }
    .context("Reconciliation run aborted")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?
        );
    } else {
        println!(
            "created {}, updated {}, deleted {}, skipped {}, past {}, failed {}",
            summary.created.len(),
            summary.updated.len(),
            summary.deleted.len(),
            summary.skipped.len(),
            summary.past.len(),
            summary.failed()
        );
    }

    if !summary.is_complete() {
        warn!(failed_windows = summary.failed_windows.len(), "checkpoint not advanced");
        bail!("{} window(s) could not be fetched", summary.failed_windows.len());
    }

    Ok(())
}
