//! Shared test helpers for `calsync-core` integration tests.
//!
//! In-memory collaborators plus work-order and event fixtures, so the
//! reconciliation tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod calendar;
pub mod source;

use calsync_domain::{
    CalendarEvent, CanonicalEvent, OrderStatus, ShippingAddress, SyncConfig, WorkOrder,
};
use chrono::{NaiveDate, NaiveDateTime};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
}

pub fn settings() -> SyncConfig {
    SyncConfig::default()
}

/// The Processing order from the reference scenario: one day, 09:00-17:00.
pub fn processing_order() -> WorkOrder {
    WorkOrder {
        service_order_id: Some("S1".into()),
        custom_order_number: Some("56561-000100".into()),
        order_status: Some(OrderStatus::Processing),
        request_from_date: Some("2024-01-10T00:00:00".into()),
        request_to_date: Some("2024-01-10T00:00:00".into()),
        request_from_time: Some("2024-01-10T09:00:00".into()),
        request_to_time: Some("2024-01-10T17:00:00".into()),
        client_company_name: Some("Acme Labs".into()),
        shipping_address: Some(ShippingAddress {
            address1: Some("1 Main St".into()),
            city: Some("Austin".into()),
            state_province_abbreviation: Some("TX".into()),
            zip_postal_code: Some("78701".into()),
        }),
    }
}

pub fn order_with(id: &str, number: &str, status: OrderStatus) -> WorkOrder {
    WorkOrder {
        service_order_id: Some(id.into()),
        custom_order_number: Some(number.into()),
        order_status: Some(status),
        ..processing_order()
    }
}

/// Calendar event as the target would list it after writing `canonical`.
pub fn listed_event(id: &str, canonical: &CanonicalEvent) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        subject: Some(canonical.subject.clone()),
        body_preview: Some(format!("{} Number of Assets: 1", canonical.body_preview)),
        body: Some(canonical.body.clone()),
        start: Some(canonical.start.clone()),
        end: Some(canonical.end.clone()),
        is_all_day: canonical.is_all_day,
        categories: canonical.categories.clone(),
        show_as: Some(canonical.show_as),
        allow_new_time_proposals: canonical.allow_new_time_proposals,
        response_requested: canonical.response_requested,
        is_reminder_on: canonical.is_reminder_on,
        is_cancelled: canonical.is_cancelled,
        location: Some(canonical.location.clone()),
        attendees: canonical.attendees.clone(),
    }
}

/// Bare event carrying only a preview, enough to be indexed.
pub fn preview_event(id: &str, preview: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        subject: None,
        body_preview: Some(preview.into()),
        body: None,
        start: None,
        end: None,
        is_all_day: false,
        categories: vec![],
        show_as: None,
        allow_new_time_proposals: false,
        response_requested: false,
        is_reminder_on: false,
        is_cancelled: false,
        location: None,
        attendees: vec![],
    }
}
