//! Week-sized walk from the checkpoint to the present.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Inclusive fetch range for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Yields consecutive windows of `step` until a window starts after `stop`.
/// The last window is clipped to `stop`.
#[derive(Debug, Clone)]
pub struct WeekWindows {
    next_start: NaiveDateTime,
    stop: NaiveDateTime,
    step: Duration,
}

impl WeekWindows {
    pub fn new(start: NaiveDateTime, stop: NaiveDateTime, days: u32) -> Self {
        Self { next_start: start, stop, step: Duration::days(i64::from(days.max(1))) }
    }
}

impl Iterator for WeekWindows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.next_start > self.stop {
            return None;
        }
        let start = self.next_start;
        let end = (start + self.step).min(self.stop);
        self.next_start = start + self.step;
        Some(Window { start, end })
    }
}
