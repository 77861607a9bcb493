//! Run-wide accounting of per-order outcomes.

use std::collections::BTreeMap;

use calsync_domain::Outcome;
use serde::Serialize;
use tracing::{error, info, warn};

use super::window::Window;

/// Accumulates outcomes while a run walks its windows.
#[derive(Debug, Default)]
pub struct RunAggregate {
    summary: RunSummary,
}

/// Final report of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub skipped: Vec<String>,
    pub past: Vec<String>,
    /// Failure message to the orders that hit it.
    pub failures: BTreeMap<String, Vec<String>>,
    pub failed_windows: Vec<FailedWindow>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedWindow {
    pub window: Window,
    pub error: String,
}

impl RunAggregate {
    pub fn new(dry_run: bool) -> Self {
        Self { summary: RunSummary { dry_run, ..RunSummary::default() } }
    }

    pub fn record(&mut self, order: impl Into<String>, outcome: Outcome) {
        let order = order.into();
        let s = &mut self.summary;
        match outcome {
            Outcome::Created => s.created.push(order),
            Outcome::Updated => s.updated.push(order),
            Outcome::Deleted => s.deleted.push(order),
            Outcome::Skipped(_) => s.skipped.push(order),
            Outcome::Past => s.past.push(order),
            Outcome::Failed(reason) => s.failures.entry(reason).or_default().push(order),
        }
    }

    pub fn record_window_failure(&mut self, window: Window, error: impl Into<String>) {
        self.summary.failed_windows.push(FailedWindow { window, error: error.into() });
    }

    pub fn finish(self) -> RunSummary {
        self.summary
    }
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.created.len()
            + self.updated.len()
            + self.deleted.len()
            + self.skipped.len()
            + self.past.len()
            + self.failed()
    }

    pub fn failed(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    /// Every window was fetched; the run may advance the checkpoint.
    pub fn is_complete(&self) -> bool {
        self.failed_windows.is_empty()
    }

    pub fn log(&self) {
        info!(
            processed = self.processed(),
            created = self.created.len(),
            updated = self.updated.len(),
            cancelled = self.deleted.len(),
            skipped = self.skipped.len(),
            past = self.past.len(),
            failed = self.failed(),
            dry_run = self.dry_run,
            "reconciliation run finished"
        );

        for (label, orders) in [
            ("created", &self.created),
            ("updated", &self.updated),
            ("cancelled", &self.deleted),
        ] {
            if !orders.is_empty() {
                info!(orders = %orders.join(", "), "{label} events");
            }
        }

        for (message, orders) in &self.failures {
            error!(count = orders.len(), orders = %orders.join(", "), "{message}");
        }

        for failed in &self.failed_windows {
            warn!(
                window_start = %failed.window.start,
                window_end = %failed.window.end,
                error = %failed.error,
                "window could not be fetched"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use calsync_domain::SkipReason;
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn groups_failures_by_message() {
        let mut agg = RunAggregate::new(false);
        agg.record("56561-000001", Outcome::Created);
        agg.record("56561-000002", Outcome::Failed("Order is missing values: RequestToTime.".into()));
        agg.record("56561-000003", Outcome::Skipped(SkipReason::UpToDate));
        agg.record("56561-000004", Outcome::Failed("Order is missing values: RequestToTime.".into()));
        agg.record("56561-000005", Outcome::Failed("Remote operation failed: 500".into()));

        let summary = agg.finish();
        assert_eq!(summary.created, vec!["56561-000001"]);
        assert_eq!(summary.skipped, vec!["56561-000003"]);
        assert_eq!(summary.failed(), 3);
        assert_eq!(summary.processed(), 5);
        assert_eq!(
            summary.failures["Order is missing values: RequestToTime."],
            vec!["56561-000002", "56561-000004"]
        );
    }

    #[test]
    fn window_failures_make_the_run_incomplete() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let mut agg = RunAggregate::new(false);
        assert!(RunSummary::default().is_complete());

        agg.record_window_failure(Window { start: at, end: at }, "timeout");
        let summary = agg.finish();
        assert!(!summary.is_complete());
        assert_eq!(summary.processed(), 0);
    }

    #[test]
    fn serializes_for_json_output() {
        let mut agg = RunAggregate::new(true);
        agg.record("56561-000001", Outcome::Deleted);
        let json = serde_json::to_value(agg.finish()).unwrap();
        assert_eq!(json["deleted"][0], "56561-000001");
        assert_eq!(json["dry_run"], true);
    }
}
