use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use calsync_core::{BodyRenderer, CheckpointStore, Clock, WorkOrderSource};
use calsync_domain::{Assignment, Attendee, CalSyncError, Result as DomainResult, WorkOrder};
use chrono::NaiveDateTime;

/// In-memory mock for `WorkOrderSource`.
///
/// Returns the same orders for every window so that cross-window
/// de-duplication can be observed; windows can be made to fail by start.
#[derive(Default)]
pub struct MockSource {
    orders: Vec<WorkOrder>,
    assignments: HashMap<String, Vec<String>>,
    employees: HashMap<String, Attendee>,
    failing_windows: Vec<NaiveDateTime>,
    fetched_windows: Mutex<Vec<(NaiveDateTime, NaiveDateTime)>>,
}

impl MockSource {
    pub fn new(orders: Vec<WorkOrder>) -> Self {
        Self { orders, ..Self::default() }
    }

    pub fn with_assignment(mut self, service_order_id: &str, employee_id: &str) -> Self {
        self.assignments
            .entry(service_order_id.to_string())
            .or_default()
            .push(employee_id.to_string());
        self
    }

    pub fn with_employee(mut self, employee_id: &str, attendee: Attendee) -> Self {
        self.employees.insert(employee_id.to_string(), attendee);
        self
    }

    pub fn failing_window(mut self, start: NaiveDateTime) -> Self {
        self.failing_windows.push(start);
        self
    }

    pub fn fetched_windows(&self) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        self.fetched_windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkOrderSource for MockSource {
    async fn fetch_work_orders(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DomainResult<Vec<WorkOrder>> {
        self.fetched_windows.lock().unwrap().push((start, end));
        if self.failing_windows.contains(&start) {
            return Err(CalSyncError::RemoteOperation("400 Bad Request".into()));
        }
        Ok(self.orders.clone())
    }

    async fn count_assets(&self, _service_order_id: &str) -> DomainResult<usize> {
        Ok(1)
    }

    async fn fetch_assignments(&self, service_order_id: &str) -> DomainResult<Vec<Assignment>> {
        Ok(self
            .assignments
            .get(service_order_id)
            .into_iter()
            .flatten()
            .map(|employee_id| Assignment { employee_id: employee_id.clone() })
            .collect())
    }

    async fn fetch_attendee(&self, employee_id: &str) -> DomainResult<Attendee> {
        self.employees
            .get(employee_id)
            .cloned()
            .ok_or_else(|| CalSyncError::RemoteOperation(format!("employee {employee_id} not found")))
    }
}

/// In-memory mock for `CheckpointStore`.
#[derive(Default)]
pub struct MockCheckpoints {
    last: Option<NaiveDateTime>,
    recorded: Mutex<Vec<NaiveDateTime>>,
}

impl MockCheckpoints {
    pub fn at(last: NaiveDateTime) -> Self {
        Self { last: Some(last), ..Self::default() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<NaiveDateTime> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckpointStore for MockCheckpoints {
    async fn last_checkpoint(&self) -> DomainResult<NaiveDateTime> {
        self.last.ok_or_else(|| CalSyncError::NoCheckpoint("checkpoint log is empty".into()))
    }

    async fn record_checkpoint(&self, cutoff: NaiveDateTime) -> DomainResult<()> {
        self.recorded.lock().unwrap().push(cutoff);
        Ok(())
    }
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Renders the hyperlink and asset count without a template.
pub struct PlainRenderer;

impl BodyRenderer for PlainRenderer {
    fn render(&self, hyperlink_html: &str, asset_count: usize) -> String {
        format!("<p>{hyperlink_html} Number of Assets: {asset_count}</p>")
    }
}
