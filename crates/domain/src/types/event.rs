//! Calendar event shapes.
//!
//! [`CalendarEvent`] is the event as listed by the calendar target.
//! [`CanonicalEvent`] is the comparison-ready projection both a work order and
//! an existing event are turned into; it is also the payload written back.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{BODY_CONTENT_TYPE_HTML, LOCATION_TYPE_DEFAULT};

/// Free/busy state shown on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShowAs {
    Free,
    Tentative,
    Busy,
    Oof,
    WorkingElsewhere,
    #[serde(other)]
    Unknown,
}

/// Local date/time plus the time zone label it is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(with = "graph_datetime")]
    pub date_time: NaiveDateTime,
    pub time_zone: String,
}

impl EventDateTime {
    pub fn new(date_time: NaiveDateTime, time_zone: impl Into<String>) -> Self {
        Self { date_time, time_zone: time_zone.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub content_type: String,
    pub content: String,
}

impl EventBody {
    pub fn html(content: impl Into<String>) -> Self {
        Self { content_type: BODY_CONTENT_TYPE_HTML.to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub display_name: String,
    pub location_type: String,
}

impl Location {
    pub fn address(display_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), location_type: LOCATION_TYPE_DEFAULT.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeType {
    Required,
    Optional,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// Event attendee. Extra response fields from the target are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(rename = "type")]
    pub kind: AttendeeType,
    pub email_address: EmailAddress,
}

impl Attendee {
    pub fn required(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            kind: AttendeeType::Required,
            email_address: EmailAddress { name: name.into(), address: address.into() },
        }
    }
}

/// Event as returned by the calendar target listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_preview: Option<String>,
    #[serde(default)]
    pub body: Option<EventBody>,
    #[serde(default)]
    pub start: Option<EventDateTime>,
    #[serde(default)]
    pub end: Option<EventDateTime>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub show_as: Option<ShowAs>,
    #[serde(default)]
    pub allow_new_time_proposals: bool,
    #[serde(default)]
    pub response_requested: bool,
    #[serde(default)]
    pub is_reminder_on: bool,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// Comparison-ready event; serializes to the target's create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    pub subject: String,
    pub body_preview: String,
    pub allow_new_time_proposals: bool,
    pub is_all_day: bool,
    pub categories: Vec<String>,
    pub show_as: ShowAs,
    pub response_requested: bool,
    pub is_reminder_on: bool,
    pub is_cancelled: bool,
    pub body: EventBody,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub location: Location,
    pub attendees: Vec<Attendee>,
}

/// Target timestamps: written with six fractional digits, read with any.
mod graph_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::constants::{SOURCE_DATETIME_FORMAT, TARGET_DATETIME_FORMAT};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TARGET_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim().trim_end_matches('Z'), SOURCE_DATETIME_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}
