//! Domain types and models

pub mod event;
pub mod order;
pub mod outcome;

pub use event::{
    Attendee, AttendeeType, CalendarEvent, CanonicalEvent, EmailAddress, EventBody,
    EventDateTime, Location, ShowAs,
};
pub use order::{
    parse_source_datetime, Assignment, OrderIdentity, OrderStatus, ShippingAddress, WorkOrder,
};
pub use outcome::{Outcome, SkipReason};
