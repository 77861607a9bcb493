//! Microsoft Graph calendar target
//!
//! Lists, reads and writes the events of one calendar owned by one mailbox.
//! All date/times are requested in the reconciliation time zone through the
//! `Prefer: outlook.timezone` header, so listed events and written payloads
//! share a single local clock.

use std::sync::Arc;

use async_trait::async_trait;
use calsync_core::CalendarTarget;
use calsync_domain::{CalSyncError, CalendarEvent, CanonicalEvent, OutlookConfig, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::auth::{send_authorized_with, CredentialProvider};
use crate::errors::InfraError;
use crate::http::{HttpClient, RetryPolicy};

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    value: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Calendar client for Microsoft Graph `v1.0`.
pub struct GraphCalendarClient {
    http: HttpClient,
    user_url: String,
    calendar_id: String,
    page_size: usize,
    timezone_preference: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GraphCalendarClient {
    pub fn new(
        http: HttpClient,
        config: &OutlookConfig,
        time_zone: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            user_url: format!(
                "{}/users/{}",
                config.graph_base_url.trim_end_matches('/'),
                config.user_id
            ),
            calendar_id: config.calendar_id.clone(),
            page_size: config.page_size.max(1),
            timezone_preference: format!(r#"outlook.timezone="{time_zone}""#),
            credentials,
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.user_url, self.calendar_id)
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/events/{}", self.user_url, event_id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url).header("Prefer", &self.timezone_preference)
    }

    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        self.send_with(RetryPolicy::Idempotent, build).await
    }

    async fn send_with<F>(&self, policy: RetryPolicy, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        send_authorized_with(&self.http, self.credentials.as_ref(), policy, build).await
    }
}

/// Render a non-success Graph response as an error.
///
/// Graph's `{"error": {"code", "message"}}` envelope becomes
/// `"Error: <code>\nMessage: <message>"`; anything else keeps the raw body.
async fn graph_error(operation: &str, response: Response) -> CalSyncError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<GraphErrorEnvelope>(&body) {
        Ok(GraphErrorEnvelope { error }) => CalSyncError::RemoteOperation(format!(
            "Error: {}\nMessage: {}",
            error.code, error.message
        )),
        Err(_) => {
            CalSyncError::RemoteOperation(format!("Outlook {operation} failed ({status}): {body}"))
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(|e| CalSyncError::from(InfraError::from(e)))?;
    serde_json::from_slice(&bytes).map_err(|e| CalSyncError::from(InfraError::from(e)))
}

#[async_trait]
impl CalendarTarget for GraphCalendarClient {
    #[instrument(skip(self), fields(calendar_id = %self.calendar_id))]
    async fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        let url = self.events_url();
        let mut events = Vec::new();
        let mut skip = 0usize;

        loop {
            let query = [("$top", self.page_size.to_string()), ("$skip", skip.to_string())];
            let response = self.send(|| self.request(Method::GET, &url).query(&query)).await?;
            if response.status() != StatusCode::OK {
                return Err(graph_error("list", response).await);
            }

            let page: EventsPage = read_json(response).await?;
            let fetched = page.value.len();
            events.extend(page.value);
            debug!(skip, fetched, "fetched calendar page");

            if fetched < self.page_size {
                break;
            }
            skip += self.page_size;
        }

        info!(count = events.len(), "listed calendar events");
        Ok(events)
    }

    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        let url = self.event_url(event_id);
        let response = self.send(|| self.request(Method::GET, &url)).await?;
        if response.status() != StatusCode::OK {
            return Err(graph_error("get", response).await);
        }
        read_json(response).await
    }

    async fn create_event(&self, event: &CanonicalEvent) -> Result<String> {
        let url = self.events_url();
        // A create the server may have committed is never repeated.
        let response = self
            .send_with(RetryPolicy::ThrottleOnly, || self.request(Method::POST, &url).json(event))
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(graph_error("create", response).await);
        }

        let created: CreatedEvent = read_json(response).await?;
        Ok(created.id)
    }

    async fn update_event(
        &self,
        event_id: &str,
        event: &CanonicalEvent,
        attendees_only: bool,
    ) -> Result<()> {
        let url = self.event_url(event_id);
        let payload = if attendees_only {
            json!({ "attendees": event.attendees })
        } else {
            serde_json::to_value(event).map_err(|e| CalSyncError::from(InfraError::from(e)))?
        };

        let response = self
            .send(|| {
                self.request(Method::PATCH, &url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload.to_string())
            })
            .await?;
        if response.status() != StatusCode::OK {
            return Err(graph_error("update", response).await);
        }
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let url = self.event_url(event_id);
        let response = self.send(|| self.request(Method::DELETE, &url)).await?;
        if response.status() != StatusCode::NO_CONTENT {
            return Err(graph_error("delete", response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use calsync_domain::{Attendee, EventBody, EventDateTime, Location, ShowAs};
    use chrono::NaiveDate;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct StaticToken;

    #[async_trait]
    impl CredentialProvider for StaticToken {
        async fn credential(&self) -> Result<String> {
            Ok("Bearer test".into())
        }

        async fn refresh(&self) -> Result<String> {
            Ok("Bearer test".into())
        }
    }

    const EVENTS_PATH: &str = "/users/sysop@example.com/calendars/cal/events";

    fn client(server: &MockServer, page_size: usize) -> GraphCalendarClient {
        client_with(server, page_size, HttpClient::builder().max_attempts(1).build().unwrap())
    }

    fn client_with(server: &MockServer, page_size: usize, http: HttpClient) -> GraphCalendarClient {
        let config = OutlookConfig {
            tenant_id: "tenant".into(),
            client_id: "client".into(),
            client_secret: "secret".into(),
            user_id: "sysop@example.com".into(),
            calendar_id: "cal".into(),
            graph_base_url: server.uri(),
            login_base_url: server.uri(),
            page_size,
        };
        GraphCalendarClient::new(http, &config, "America/Chicago", Arc::new(StaticToken))
    }

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
            body: EventBody::html("<p>body</p>"),
            start: EventDateTime::new(day.and_hms_opt(9, 0, 0).unwrap(), "America/Chicago"),
            end: EventDateTime::new(day.and_hms_opt(17, 0, 0).unwrap(), "America/Chicago"),
            location: Location::address("1 Main St, Austin, TX 78701"),
            attendees: vec![Attendee::required("Pat Doe", "pat@example.com")],
        }
    }

    fn listed(id: &str) -> serde_json::Value {
        json!({ "id": id, "bodyPreview": "56561-000100" })
    }

    #[tokio::test]
    async fn pages_until_short_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(query_param("$skip", "0"))
            .and(query_param("$top", "2"))
            .and(header("Prefer", r#"outlook.timezone="America/Chicago""#))
            .and(header("Authorization", "Bearer test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "value": [listed("a"), listed("b")] })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(query_param("$skip", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [listed("c")] })))
            .expect(1)
            .mount(&server)
            .await;

        let events = client(&server, 2).list_events().await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn create_returns_new_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "evt-new" })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server, 1000).create_event(&event()).await.unwrap();
        assert_eq!(id, "evt-new");
    }

    #[tokio::test]
    async fn create_is_not_repeated_after_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "evt-2" })))
            .expect(0)
            .mount(&server)
            .await;

        let http = HttpClient::builder()
            .max_attempts(3)
            .base_backoff(std::time::Duration::from_millis(1))
            .build()
            .unwrap();
        let result = client_with(&server, 1000, http).create_event(&event()).await;

        assert!(matches!(result, Err(CalSyncError::RemoteOperation(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn create_retries_after_throttling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "evt-2" })))
            .expect(1)
            .mount(&server)
            .await;

        let http = HttpClient::builder().max_attempts(3).build().unwrap();
        let id = client_with(&server, 1000, http).create_event(&event()).await.unwrap();

        assert_eq!(id, "evt-2");
    }

    #[tokio::test]
    async fn create_rejection_uses_graph_error_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": "ErrorInvalidRequest", "message": "Bad start" }
            })))
            .mount(&server)
            .await;

        match client(&server, 1000).create_event(&event()).await {
            Err(CalSyncError::RemoteOperation(msg)) => {
                assert_eq!(msg, "Error: ErrorInvalidRequest\nMessage: Bad start");
            }
            other => panic!("expected remote operation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn attendee_only_update_sends_only_attendees() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/users/sysop@example.com/events/evt1"))
            .and(body_json(json!({
                "attendees": [{
                    "type": "required",
                    "emailAddress": { "name": "Pat Doe", "address": "pat@example.com" }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "evt1" })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, 1000).update_event("evt1", &event(), true).await.unwrap();
    }

    #[tokio::test]
    async fn full_update_sends_canonical_event() {
        let server = MockServer::start().await;
        let expected = serde_json::to_value(event()).unwrap();
        Mock::given(method("PATCH"))
            .and(path("/users/sysop@example.com/events/evt1"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "evt1" })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, 1000).update_event("evt1", &event(), false).await.unwrap();
    }

    #[tokio::test]
    async fn delete_expects_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/sysop@example.com/events/evt1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/users/sysop@example.com/events/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = client(&server, 1000);
        client.delete_event("evt1").await.unwrap();
        assert!(matches!(
            client.delete_event("gone").await,
            Err(CalSyncError::RemoteOperation(msg)) if msg.contains("404")
        ));
    }
}
