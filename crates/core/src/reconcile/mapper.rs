//! Projection of work orders and existing calendar events into
//! [`CanonicalEvent`]s.

use calsync_domain::{
    Attendee, CalSyncError, CalendarEvent, CanonicalEvent, EventBody, EventDateTime, Location,
    OrderStatus, Result, ShowAs, WorkOrder,
};

use super::index::OrderKeyExtractor;
use super::schedule::ResolvedSchedule;

/// Builds canonical events. Performs no I/O.
#[derive(Debug, Clone)]
pub struct EventMapper {
    time_zone: String,
    service_order_url: String,
}

impl EventMapper {
    pub fn new(time_zone: impl Into<String>, service_order_url: impl Into<String>) -> Self {
        Self { time_zone: time_zone.into(), service_order_url: service_order_url.into() }
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    /// Link to the order page, labelled with the custom order number.
    pub fn hyperlink(&self, service_order_id: &str, custom_order_number: &str) -> String {
        format!(r#"<a href="{}{}">{}</a>"#, self.service_order_url, service_order_id, custom_order_number)
    }

    pub fn to_canonical(
        &self,
        order: &WorkOrder,
        schedule: &ResolvedSchedule,
        body: String,
        address: String,
        attendees: Vec<Attendee>,
    ) -> CanonicalEvent {
        let status = order.order_status.as_ref();
        let show_as = match status {
            Some(OrderStatus::Scheduling) => ShowAs::Tentative,
            Some(OrderStatus::Processing) => ShowAs::Busy,
            _ => ShowAs::Free,
        };

        CanonicalEvent {
            subject: order.client_company_name.clone().unwrap_or_default(),
            body_preview: order.custom_order_number.clone().unwrap_or_default(),
            allow_new_time_proposals: false,
            is_all_day: schedule.is_all_day,
            categories: Vec::new(),
            show_as,
            response_requested: false,
            is_reminder_on: false,
            is_cancelled: matches!(status, Some(OrderStatus::Cancelled)),
            body: EventBody::html(body),
            start: EventDateTime::new(schedule.start, &self.time_zone),
            end: EventDateTime::new(schedule.end, &self.time_zone),
            location: Location::address(address),
            attendees,
        }
    }

    /// Canonical form of an event already on the calendar.
    ///
    /// The preview is reduced to the order number it carries, and times are
    /// relabelled with the configured zone since the target already returns
    /// them in it.
    pub fn project_existing(
        &self,
        event: &CalendarEvent,
        extractor: &OrderKeyExtractor,
    ) -> Result<CanonicalEvent> {
        let (Some(start), Some(end)) = (&event.start, &event.end) else {
            return Err(CalSyncError::InvalidInput(format!(
                "calendar event {} has no start or end",
                event.id
            )));
        };

        let preview = event.body_preview.clone().unwrap_or_default();
        let body_preview = extractor.order_number(&preview).unwrap_or(preview);

        Ok(CanonicalEvent {
            subject: event.subject.clone().unwrap_or_default(),
            body_preview,
            allow_new_time_proposals: event.allow_new_time_proposals,
            is_all_day: event.is_all_day,
            categories: event.categories.clone(),
            show_as: event.show_as.unwrap_or(ShowAs::Unknown),
            response_requested: event.response_requested,
            is_reminder_on: event.is_reminder_on,
            is_cancelled: event.is_cancelled,
            body: event.body.clone().unwrap_or_else(|| EventBody::html("")),
            start: EventDateTime::new(start.date_time, &self.time_zone),
            end: EventDateTime::new(end.date_time, &self.time_zone),
            location: event.location.clone().unwrap_or_default(),
            attendees: event.attendees.clone(),
        })
    }
}
