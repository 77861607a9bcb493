use std::sync::Mutex;

use async_trait::async_trait;
use calsync_core::CalendarTarget;
use calsync_domain::{CalSyncError, CalendarEvent, CanonicalEvent, Result as DomainResult};

/// Write issued against the calendar.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarCall {
    Create(CanonicalEvent),
    Update { event_id: String, event: CanonicalEvent, attendees_only: bool },
    Delete(String),
}

/// In-memory mock for `CalendarTarget`.
///
/// Serves a fixed listing and records every write. Writes never change the
/// listing, matching the run's snapshot semantics.
#[derive(Default)]
pub struct MockCalendar {
    events: Vec<CalendarEvent>,
    calls: Mutex<Vec<CalendarCall>>,
    list_calls: Mutex<usize>,
    fail_listing: bool,
    fail_writes: bool,
}

impl MockCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events, ..Self::default() }
    }

    pub fn failing_listing() -> Self {
        Self { fail_listing: true, ..Self::default() }
    }

    /// Every create/update/delete fails as if retries were exhausted.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<CalendarCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    fn write(&self, call: CalendarCall) -> DomainResult<()> {
        if self.fail_writes {
            return Err(CalSyncError::RemoteOperation("Error: ErrorServerBusy\nMessage: busy".into()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl CalendarTarget for MockCalendar {
    async fn list_events(&self) -> DomainResult<Vec<CalendarEvent>> {
        *self.list_calls.lock().unwrap() += 1;
        if self.fail_listing {
            return Err(CalSyncError::Network("calendar unreachable".into()));
        }
        Ok(self.events.clone())
    }

    async fn get_event(&self, event_id: &str) -> DomainResult<CalendarEvent> {
        self.events
            .iter()
            .find(|event| event.id == event_id)
            .cloned()
            .ok_or_else(|| CalSyncError::RemoteOperation(format!("event {event_id} not found")))
    }

    async fn create_event(&self, event: &CanonicalEvent) -> DomainResult<String> {
        self.write(CalendarCall::Create(event.clone()))?;
        Ok(format!("new-{}", self.calls.lock().unwrap().len()))
    }

    async fn update_event(
        &self,
        event_id: &str,
        event: &CanonicalEvent,
        attendees_only: bool,
    ) -> DomainResult<()> {
        self.write(CalendarCall::Update {
            event_id: event_id.to_string(),
            event: event.clone(),
            attendees_only,
        })
    }

    async fn delete_event(&self, event_id: &str) -> DomainResult<()> {
        self.write(CalendarCall::Delete(event_id.to_string()))
    }
}
