//! Cron-driven reconciliation runs.
//!
//! Wraps a [`ReconcileJob`] in a `tokio-cron-scheduler` job. Runs never
//! overlap: a tick that fires while the previous run is still in progress is
//! skipped with a warning. Lifecycle is explicit (`start`/`stop`), the monitor
//! task is joined on stop, and every scheduler operation is bounded by a
//! timeout. A run itself is never cut short: it either walks its whole window
//! or fails on its own.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use calsync_infra::scheduling::{
//!     ReconcileJob, ReconcileScheduler, ReconcileSchedulerConfig, SchedulerResult,
//! };
//!
//! # async fn example(job: Arc<dyn ReconcileJob>) -> SchedulerResult<()> {
//! let mut scheduler = ReconcileScheduler::with_config(
//!     ReconcileSchedulerConfig {
//!         cron_expression: "0 0 6 * * *".into(), // daily at 06:00
//!         ..Default::default()
//!     },
//!     job,
//! );
//!
//! scheduler.start().await?;
//! tokio::signal::ctrl_c().await.ok();
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use calsync_core::{ReconciliationService, RunSummary};
use calsync_domain::Result;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// One reconciliation run, as triggered by the scheduler.
#[async_trait]
pub trait ReconcileJob: Send + Sync + 'static {
    async fn run_once(&self) -> Result<RunSummary>;
}

#[async_trait]
impl ReconcileJob for ReconciliationService {
    async fn run_once(&self) -> Result<RunSummary> {
        self.run().await
    }
}

/// Configuration for the reconciliation scheduler.
#[derive(Debug, Clone)]
pub struct ReconcileSchedulerConfig {
    /// Cron expression (with seconds field) describing the schedule.
    pub cron_expression: String,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for ReconcileSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 0 6 * * *".into(),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Reconciliation scheduler with explicit lifecycle management.
pub struct ReconcileScheduler {
    scheduler: Option<JobScheduler>,
    config: ReconcileSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    job: Arc<dyn ReconcileJob>,
    in_flight: Arc<Mutex<()>>,
}

impl ReconcileScheduler {
    pub fn new(cron_expression: String, job: Arc<dyn ReconcileJob>) -> Self {
        let config = ReconcileSchedulerConfig { cron_expression, ..Default::default() };
        Self::with_config(config, job)
    }

    pub fn with_config(config: ReconcileSchedulerConfig, job: Arc<dyn ReconcileJob>) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            job,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?
            .map_err(|source| SchedulerError::StartFailed { source })?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        self.monitor_handle = Some(tokio::spawn(Self::monitor_task(cancel)));

        info!("Reconciliation scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    ///
    /// A run already in progress is not interrupted.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?
            .map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!("Reconciliation scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler =
            JobScheduler::new().await.map_err(|source| SchedulerError::CreationFailed { source })?;

        let job = Arc::clone(&self.job);
        let in_flight = Arc::clone(&self.in_flight);

        let cron = self.config.cron_expression.as_str();
        let job_definition = Job::new_async(cron, move |_id, _lock| {
            let job = Arc::clone(&job);
            let in_flight = Arc::clone(&in_flight);

            Box::pin(async move {
                let Ok(_guard) = in_flight.try_lock_owned() else {
                    warn!("Previous reconciliation run still in progress; skipping this tick");
                    return;
                };

                let started = Instant::now();
                match job.run_once().await {
                    Ok(summary) => {
                        info!(
                            processed = summary.processed(),
                            failed = summary.failed(),
                            complete = summary.is_complete(),
                            elapsed_ms = u64::try_from(started.elapsed().as_millis())
                                .unwrap_or(u64::MAX),
                            "Scheduled reconciliation finished"
                        );
                    }
                    Err(err) => {
                        error!(
                            error = %err,
                            fatal = err.is_fatal(),
                            "Scheduled reconciliation failed"
                        );
                    }
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(
            cron = %self.config.cron_expression,
            job_id = %job_id,
            "Registered reconciliation job"
        );
        Ok(scheduler)
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Reconciliation scheduler monitor cancelled");
    }
}

impl Drop for ReconcileScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ReconcileScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
