//! Schedule command - reconcile on a cron schedule until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use calsync_domain::Config;
use calsync_infra::scheduling::{ReconcileJob, ReconcileScheduler};
use clap::Args;
use tracing::info;

use crate::context::AppContext;

/// Arguments for the schedule command.
#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// Cron expression with a seconds field, e.g. `0 0 6 * * *`.
    #[arg(long, env = "CALSYNC_CRON", default_value = "0 0 6 * * *")]
    pub cron: String,

    /// Compute outcomes without writing to the calendar.
    #[arg(long, env = "CALSYNC_DRY_RUN")]
    pub dry_run: bool,
}

/// Execute the schedule command.
///
/// # Errors
///
/// Returns an error if the context cannot be built or the scheduler fails to
/// start or stop.
pub async fn execute(args: ScheduleArgs, mut config: Config) -> Result<()> {
    config.sync.dry_run |= args.dry_run;
    let context = AppContext::new(config).context("Failed to initialise calsync")?;

    let job: Arc<dyn ReconcileJob> = context.service;
    let mut scheduler = ReconcileScheduler::new(args.cron.clone(), job);
    scheduler.start().await.context("Failed to start scheduler")?;
    info!(cron = %args.cron, "waiting for scheduled runs; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("shutdown requested");

    scheduler.stop().await.context("Failed to stop scheduler")?;
    Ok(())
}
