//! Derives event start/end times from a work order's request fields.
//!
//! Precedence:
//! 1. All four of `RequestFromDate`, `RequestToDate`, `RequestFromTime` and
//!    `RequestToTime` present: combine dates with times. An end that falls
//!    before the start is read as an AM/PM slip when its time of day is
//!    before noon and moved 12 hours later; otherwise the order is rejected.
//! 2. At least one date present: a single date is used for both ends. With
//!    no times the event is all-day (`end` is midnight after `RequestToDate`);
//!    with one time the other defaults to 07:00 (start) or 17:00 (end).
//! 3. No dates: the order is rejected, naming every absent field.

use calsync_domain::constants::{
    AM_PM_CORRECTION_HOURS, DEFAULT_END_HOUR, DEFAULT_START_HOUR, FIELD_REQUEST_FROM_DATE,
    FIELD_REQUEST_FROM_TIME, FIELD_REQUEST_TO_DATE, FIELD_REQUEST_TO_TIME, NOON_HOUR,
};
use calsync_domain::{CalSyncError, Result, WorkOrder};
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use tracing::warn;

/// Normalized event times for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_all_day: bool,
    /// The end was moved 12 hours later to repair an AM/PM slip.
    pub am_pm_corrected: bool,
}

/// Resolves [`ResolvedSchedule`]s; carries the link used in diagnostics.
#[derive(Debug, Clone)]
pub struct ScheduleResolver {
    service_order_url: String,
}

impl ScheduleResolver {
    pub fn new(service_order_url: impl Into<String>) -> Self {
        Self { service_order_url: service_order_url.into() }
    }

    pub fn resolve(&self, order: &WorkOrder) -> Result<ResolvedSchedule> {
        let from_date = order.request_from_date()?;
        let to_date = order.request_to_date()?;
        let from_time = order.request_from_time()?;
        let to_time = order.request_to_time()?;

        match (from_date, to_date, from_time, to_time) {
            (Some(from_date), Some(to_date), Some(from_time), Some(to_time)) => {
                let start = from_date.date().and_time(from_time.time());
                let end = to_date.date().and_time(to_time.time());
                self.order_range(order, start, end)
            }
            (from_date, to_date, from_time, to_time) if from_date.is_some() || to_date.is_some() => {
                // Either date stands in for the other (same-day assumption).
                let (Some(from_date), Some(to_date)) =
                    (from_date.or(to_date), to_date.or(from_date))
                else {
                    return Err(CalSyncError::Internal("date fallback produced no date".into()));
                };

                if from_time.is_none() && to_time.is_none() {
                    warn!(
                        service_order_id = order.service_order_id.as_deref().unwrap_or_default(),
                        "order has no request times; scheduling as all-day event"
                    );
                    return Ok(ResolvedSchedule {
                        start: from_date.date().and_time(NaiveTime::MIN),
                        end: to_date.date().and_time(NaiveTime::MIN) + Duration::days(1),
                        is_all_day: true,
                        am_pm_corrected: false,
                    });
                }

                let start_time = from_time.map_or_else(|| at_hour(DEFAULT_START_HOUR), |t| t.time());
                let end_time = to_time.map_or_else(|| at_hour(DEFAULT_END_HOUR), |t| t.time());

                Ok(ResolvedSchedule {
                    start: from_date.date().and_time(start_time),
                    end: to_date.date().and_time(end_time),
                    is_all_day: false,
                    am_pm_corrected: false,
                })
            }
            (_, _, from_time, to_time) => {
                let mut missing = Vec::new();
                if from_time.is_none() {
                    missing.push(FIELD_REQUEST_FROM_TIME);
                }
                if to_time.is_none() {
                    missing.push(FIELD_REQUEST_TO_TIME);
                }
                missing.push(FIELD_REQUEST_FROM_DATE);
                missing.push(FIELD_REQUEST_TO_DATE);
                Err(CalSyncError::missing_fields(missing))
            }
        }
    }

    fn order_range(
        &self,
        order: &WorkOrder,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<ResolvedSchedule> {
        if start <= end {
            return Ok(ResolvedSchedule { start, end, is_all_day: false, am_pm_corrected: false });
        }

        let service_order_id = order.service_order_id.clone().unwrap_or_default();
        let url = format!("{}{}", self.service_order_url, service_order_id);

        if end.hour() < NOON_HOUR {
            warn!(
                service_order_id = %service_order_id,
                %url,
                "order ends before it starts; correcting end time from AM to PM, fix the order manually"
            );
            return Ok(ResolvedSchedule {
                start,
                end: end + Duration::hours(AM_PM_CORRECTION_HOURS),
                is_all_day: false,
                am_pm_corrected: true,
            });
        }

        Err(CalSyncError::InvertedRange { service_order_id, url })
    }
}

fn at_hour(hour: u32) -> NaiveTime {
    NaiveTime::MIN + Duration::hours(i64::from(hour))
}
