//! Scheduling infrastructure for unattended reconciliation runs
//!
//! The scheduler follows the usual runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod error;
pub mod reconcile_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use reconcile_scheduler::{ReconcileJob, ReconcileScheduler, ReconcileSchedulerConfig};
