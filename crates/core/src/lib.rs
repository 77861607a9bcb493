//! # calsync Core
//!
//! Pure reconciliation logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Schedule resolution, event mapping, indexing and diffing
//! - The per-order state machine and the window run loop
//! - Port interfaces (traits) for the work-order source, the calendar
//!   target, checkpoint storage, body rendering and the clock
//!
//! ## Architecture Principles
//! - Only depends on `calsync-domain`
//! - No HTTP, file or platform code
//! - All external dependencies via traits

pub mod reconcile;

pub use reconcile::ports::{BodyRenderer, CalendarTarget, CheckpointStore, Clock, WorkOrderSource};
pub use reconcile::{
    diff, EventDiff, EventField, EventIndex, EventMapper, OrderKeyExtractor, OrderProcessor,
    ReconciliationService, ResolvedSchedule, RunSummary, ScheduleResolver,
};
