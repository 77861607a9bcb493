//! Field-level comparison of canonical events.

use std::collections::BTreeSet;
use std::fmt;

use calsync_domain::CanonicalEvent;
use serde::Serialize;

/// Comparable top-level event fields. `body` is intentionally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventField {
    Subject,
    BodyPreview,
    AllowNewTimeProposals,
    IsAllDay,
    Categories,
    ShowAs,
    ResponseRequested,
    IsReminderOn,
    IsCancelled,
    Start,
    End,
    Location,
    Attendees,
}

impl EventField {
    pub const ALL: [EventField; 13] = [
        Self::Subject,
        Self::BodyPreview,
        Self::AllowNewTimeProposals,
        Self::IsAllDay,
        Self::Categories,
        Self::ShowAs,
        Self::ResponseRequested,
        Self::IsReminderOn,
        Self::IsCancelled,
        Self::Start,
        Self::End,
        Self::Location,
        Self::Attendees,
    ];

    /// Wire name of the field on the calendar target.
    pub fn name(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::BodyPreview => "bodyPreview",
            Self::AllowNewTimeProposals => "allowNewTimeProposals",
            Self::IsAllDay => "isAllDay",
            Self::Categories => "categories",
            Self::ShowAs => "showAs",
            Self::ResponseRequested => "responseRequested",
            Self::IsReminderOn => "isReminderOn",
            Self::IsCancelled => "isCancelled",
            Self::Start => "start",
            Self::End => "end",
            Self::Location => "location",
            Self::Attendees => "attendees",
        }
    }

    fn differs(self, a: &CanonicalEvent, b: &CanonicalEvent) -> bool {
        match self {
            Self::Subject => a.subject != b.subject,
            Self::BodyPreview => a.body_preview != b.body_preview,
            Self::AllowNewTimeProposals => a.allow_new_time_proposals != b.allow_new_time_proposals,
            Self::IsAllDay => a.is_all_day != b.is_all_day,
            Self::Categories => a.categories != b.categories,
            Self::ShowAs => a.show_as != b.show_as,
            Self::ResponseRequested => a.response_requested != b.response_requested,
            Self::IsReminderOn => a.is_reminder_on != b.is_reminder_on,
            Self::IsCancelled => a.is_cancelled != b.is_cancelled,
            Self::Start => a.start != b.start,
            Self::End => a.end != b.end,
            Self::Location => a.location != b.location,
            Self::Attendees => a.attendees != b.attendees,
        }
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of fields that differ between two events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDiff(BTreeSet<EventField>);

impl EventDiff {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Only the attendee list changed.
    pub fn attendees_only(&self) -> bool {
        self.0.len() == 1 && self.0.contains(&EventField::Attendees)
    }

    pub fn fields(&self) -> impl Iterator<Item = EventField> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, field: EventField) -> bool {
        self.0.contains(&field)
    }
}

impl fmt::Display for EventDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.fields().map(EventField::name).collect();
        f.write_str(&names.join(", "))
    }
}

pub fn diff(existing: &CanonicalEvent, incoming: &CanonicalEvent) -> EventDiff {
    EventDiff(
        EventField::ALL
            .into_iter()
            .filter(|field| field.differs(existing, incoming))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use calsync_domain::{Attendee, EventBody, EventDateTime, Location, ShowAs};
    use chrono::NaiveDate;

    use super::*;

    fn event() -> CanonicalEvent {
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        CanonicalEvent {
            subject: "Acme Labs".into(),
            body_preview: "56561-000100".into(),
            allow_new_time_proposals: false,
            is_all_day: false,
            categories: vec![],
            show_as: ShowAs::Busy,
            response_requested: false,
            is_reminder_on: false,
            is_cancelled: false,
            body: EventBody::html("<p>one</p>"),
            start: EventDateTime::new(day.and_hms_opt(9, 0, 0).unwrap(), "America/Chicago"),
            end: EventDateTime::new(day.and_hms_opt(17, 0, 0).unwrap(), "America/Chicago"),
            location: Location::address("1 Main St"),
            attendees: vec![Attendee::required("Pat Doe", "pat@example.com")],
        }
    }

    #[test]
    fn identical_events_have_no_diff() {
        assert!(diff(&event(), &event()).is_empty());
    }

    #[test]
    fn body_is_never_compared() {
        let other = CanonicalEvent { body: EventBody::html("<p>two</p>"), ..event() };
        assert!(diff(&event(), &other).is_empty());
    }

    #[test]
    fn attendee_only_change_is_flagged() {
        let other = CanonicalEvent { attendees: vec![], ..event() };
        let d = diff(&event(), &other);
        assert!(d.attendees_only());
        assert_eq!(d.to_string(), "attendees");
    }

    #[test]
    fn several_changes_are_all_reported() {
        let mut other = event();
        other.show_as = ShowAs::Tentative;
        other.attendees.clear();
        other.end.date_time += chrono::Duration::hours(1);

        let d = diff(&event(), &other);
        assert!(!d.attendees_only());
        assert_eq!(
            d.fields().collect::<Vec<_>>(),
            vec![EventField::ShowAs, EventField::End, EventField::Attendees]
        );
    }

    #[test]
    fn attendee_order_matters() {
        let mut a = event();
        a.attendees.push(Attendee::required("Sam Roe", "sam@example.com"));
        let mut b = a.clone();
        b.attendees.reverse();
        assert!(diff(&a, &b).contains(EventField::Attendees));
    }
}
