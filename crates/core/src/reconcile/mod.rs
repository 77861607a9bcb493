//! Work order to calendar reconciliation

pub mod aggregate;
pub mod differ;
pub mod index;
pub mod mapper;
pub mod ports;
pub mod processor;
pub mod schedule;
pub mod service;
pub mod window;

pub use aggregate::{FailedWindow, RunAggregate, RunSummary};
pub use differ::{diff, EventDiff, EventField};
pub use index::{EventIndex, EventIndexEntry, OrderKeyExtractor};
pub use mapper::EventMapper;
pub use ports::*;
pub use processor::OrderProcessor;
pub use schedule::{ResolvedSchedule, ScheduleResolver};
pub use service::ReconciliationService;
pub use window::{WeekWindows, Window};
