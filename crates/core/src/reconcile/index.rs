//! Lookup of existing calendar events by order keys.

use calsync_domain::constants::ORDER_NUMBER_DIGITS;
use calsync_domain::{CalSyncError, CalendarEvent, Result};
use regex::Regex;
use tracing::debug;
use url::Url;

/// Pulls order keys out of event text.
#[derive(Debug, Clone)]
pub struct OrderKeyExtractor {
    order_number: Regex,
    href: Regex,
    service_order_url: String,
}

impl OrderKeyExtractor {
    /// `prefix` is the fixed part of custom order numbers (`"56561"`);
    /// `service_order_url` is the link base the event body points at.
    pub fn new(prefix: &str, service_order_url: impl Into<String>) -> Result<Self> {
        let order_number =
            Regex::new(&format!(r"{}-\d{{{}}}", regex::escape(prefix), ORDER_NUMBER_DIGITS))
                .map_err(|e| CalSyncError::Config(format!("invalid order number prefix: {e}")))?;
        let href = Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*"([^"]*)""#)
            .map_err(|e| CalSyncError::Internal(e.to_string()))?;

        Ok(Self { order_number, href, service_order_url: service_order_url.into() })
    }

    /// First custom order number appearing in `text`.
    pub fn order_number(&self, text: &str) -> Option<String> {
        self.order_number.find(text).map(|m| m.as_str().to_string())
    }

    /// Source order id from the first service-order hyperlink in `html`.
    pub fn service_order_id(&self, html: &str) -> Option<String> {
        self.href
            .captures_iter(html)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .filter(|href| href.starts_with(&self.service_order_url))
            .find_map(last_path_segment)
    }
}

fn last_path_segment(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// One indexed calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIndexEntry {
    pub service_order_id: Option<String>,
    pub custom_order_number: Option<String>,
    pub event_id: String,
}

/// Snapshot of the calendar taken once per run.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    entries: Vec<EventIndexEntry>,
}

impl EventIndex {
    pub fn build(events: &[CalendarEvent], extractor: &OrderKeyExtractor) -> Self {
        let entries = events
            .iter()
            .map(|event| {
                let service_order_id = event
                    .body
                    .as_ref()
                    .and_then(|body| extractor.service_order_id(&body.content));
                let custom_order_number =
                    event.body_preview.as_deref().and_then(|text| extractor.order_number(text));

                if service_order_id.is_none() && custom_order_number.is_none() {
                    debug!(event_id = %event.id, "calendar event carries no order keys");
                }

                EventIndexEntry { service_order_id, custom_order_number, event_id: event.id.clone() }
            })
            .collect();

        Self { entries }
    }

    /// First entry, in build order, matching either key.
    ///
    /// An entry matching only the custom number can win over a later entry
    /// matching the service order id; callers get whichever comes first.
    pub fn lookup(
        &self,
        service_order_id: Option<&str>,
        custom_order_number: Option<&str>,
    ) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| {
                matches_key(entry.service_order_id.as_deref(), service_order_id)
                    || matches_key(entry.custom_order_number.as_deref(), custom_order_number)
            })
            .map(|entry| entry.event_id.as_str())
    }

    pub fn entries(&self) -> &[EventIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn matches_key(indexed: Option<&str>, wanted: Option<&str>) -> bool {
    matches!((indexed, wanted), (Some(a), Some(b)) if a == b)
}
