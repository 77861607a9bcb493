//! Port interfaces for reconciliation
//!
//! These traits define the boundaries between the reconciliation engine and
//! the remote platforms it reads from and writes to. Transport, pagination,
//! authentication and retry policy all live behind them.

use async_trait::async_trait;
use calsync_domain::{
    Assignment, Attendee, CalendarEvent, CanonicalEvent, Result, WorkOrder,
};
use chrono::NaiveDateTime;

/// Work-order source (read-only)
#[async_trait]
pub trait WorkOrderSource: Send + Sync {
    /// Fetch every on-site work order requested within `[start, end]`.
    async fn fetch_work_orders(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<WorkOrder>>;

    /// Number of assets (work items) attached to an order.
    async fn count_assets(&self, service_order_id: &str) -> Result<usize>;

    /// Technician assignments for an order.
    async fn fetch_assignments(&self, service_order_id: &str) -> Result<Vec<Assignment>>;

    /// Resolve an employee into a calendar attendee.
    async fn fetch_attendee(&self, employee_id: &str) -> Result<Attendee>;
}

/// Calendar target (read/write)
#[async_trait]
pub trait CalendarTarget: Send + Sync {
    /// Full listing of the configured calendar.
    async fn list_events(&self) -> Result<Vec<CalendarEvent>>;

    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent>;

    /// Create an event and return its identifier.
    async fn create_event(&self, event: &CanonicalEvent) -> Result<String>;

    /// Update an event; with `attendees_only` only the attendee list is sent.
    async fn update_event(
        &self,
        event_id: &str,
        event: &CanonicalEvent,
        attendees_only: bool,
    ) -> Result<()>;

    async fn delete_event(&self, event_id: &str) -> Result<()>;
}

/// Storage for the end of the previously reconciled window
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Last successful run's cutoff. Fails with `NoCheckpoint` when absent.
    async fn last_checkpoint(&self) -> Result<NaiveDateTime>;

    /// Record the cutoff of a run that fetched every window.
    async fn record_checkpoint(&self, cutoff: NaiveDateTime) -> Result<()>;
}

/// Renders the HTML body of an event.
pub trait BodyRenderer: Send + Sync {
    fn render(&self, hyperlink_html: &str, asset_count: usize) -> String;
}

/// Wall clock in the reconciliation time zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
