//! Reconciliation run loop.

use std::collections::HashSet;
use std::sync::Arc;

use calsync_domain::{Result, SyncConfig};
use chrono::{NaiveDateTime, NaiveTime};
use tracing::{error, info, warn};

use super::aggregate::{RunAggregate, RunSummary};
use super::index::EventIndex;
use super::ports::{BodyRenderer, CalendarTarget, CheckpointStore, Clock, WorkOrderSource};
use super::processor::OrderProcessor;
use super::window::WeekWindows;

/// Walks the windows between the checkpoint and now, one order at a time.
pub struct ReconciliationService {
    source: Arc<dyn WorkOrderSource>,
    target: Arc<dyn CalendarTarget>,
    checkpoints: Arc<dyn CheckpointStore>,
    clock: Arc<dyn Clock>,
    processor: OrderProcessor,
    window_days: u32,
}

impl ReconciliationService {
    pub fn new(
        source: Arc<dyn WorkOrderSource>,
        target: Arc<dyn CalendarTarget>,
        checkpoints: Arc<dyn CheckpointStore>,
        renderer: Arc<dyn BodyRenderer>,
        clock: Arc<dyn Clock>,
        settings: &SyncConfig,
    ) -> Result<Self> {
        let processor =
            OrderProcessor::new(Arc::clone(&source), Arc::clone(&target), renderer, settings)?;
        Ok(Self { source, target, checkpoints, clock, processor, window_days: settings.window_days })
    }

    /// Run from the stored checkpoint. A missing checkpoint aborts the run.
    pub async fn run(&self) -> Result<RunSummary> {
        let since = self.checkpoints.last_checkpoint().await?;
        self.run_from(since).await
    }

    /// Run from an explicit start, ignoring the stored checkpoint.
    pub async fn run_from(&self, since: NaiveDateTime) -> Result<RunSummary> {
        let start = since.date().and_time(NaiveTime::MIN);
        let now = self.clock.now();
        let today = now.date();
        let dry_run = self.processor.is_dry_run();

        info!(window_start = %start, until = %now, dry_run, "starting reconciliation run");

        let events = self.target.list_events().await?;
        let index = EventIndex::build(&events, self.processor.extractor());
        info!(events = index.len(), "indexed calendar events");

        let mut aggregate = RunAggregate::new(dry_run);
        let mut seen = HashSet::new();

        for window in WeekWindows::new(start, now, self.window_days) {
            let orders = match self.source.fetch_work_orders(window.start, window.end).await {
                Ok(orders) => orders,
                Err(err) => {
                    warn!(
                        window_start = %window.start,
                        window_end = %window.end,
                        error = %err,
                        "failed to fetch work orders for window"
                    );
                    aggregate.record_window_failure(window, err.to_string());
                    continue;
                }
            };
            info!(
                window_start = %window.start,
                window_end = %window.end,
                orders = orders.len(),
                "processing window"
            );

            for order in &orders {
                if let Some(id) = &order.service_order_id {
                    if !seen.insert(id.clone()) {
                        continue;
                    }
                }
                let outcome = self.processor.process(order, &index, today).await;
                aggregate.record(order.label(), outcome);
            }
        }

        let summary = aggregate.finish();
        summary.log();

        if summary.is_complete() && !dry_run {
            if let Err(err) = self.checkpoints.record_checkpoint(now).await {
                error!(error = %err, "failed to record checkpoint");
            }
        } else if !summary.is_complete() {
            warn!(
                failed_windows = summary.failed_windows.len(),
                "not advancing checkpoint; some windows were not fetched"
            );
        }

        Ok(summary)
    }
}
