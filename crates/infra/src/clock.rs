//! Wall clock in the reconciliation time zone

use calsync_core::Clock;
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}
