//! Per-order reconciliation outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why an order was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No `RequestToDate`, so the order cannot be scheduled.
    Unschedulable,
    /// Cancelled order with no calendar event to remove.
    NothingToDelete,
    /// The calendar event already matches the order.
    UpToDate,
}

/// Exactly one outcome is produced per order per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Updated,
    /// The order was cancelled and its event removed.
    Deleted,
    Skipped(SkipReason),
    Past,
    Failed(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "cancelled"),
            Self::Skipped(reason) => write!(f, "skipped ({reason:?})"),
            Self::Past => write!(f, "past"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
