//! Qualer work-order source.
//!
//! Read-only client over the Qualer REST API. Rate limiting and transient
//! failures are absorbed by [`HttpClient`]; a rejected token is refreshed once
//! through the [`CredentialProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use calsync_core::WorkOrderSource;
use calsync_domain::{Assignment, Attendee, CalSyncError, QualerConfig, Result, WorkOrder};
use chrono::NaiveDateTime;
use reqwest::header::ACCEPT;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::auth::{send_authorized, CredentialProvider};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Timestamp layout of the `from`/`to` query parameters.
const QUERY_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Employee {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    subscription_email: Option<String>,
}

/// Client for the Qualer service API.
pub struct QualerClient {
    http: HttpClient,
    base_url: String,
    work_order_status: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl QualerClient {
    pub fn new(
        http: HttpClient,
        config: &QualerConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            work_order_status: config.work_order_status.clone(),
            credentials,
        }
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = send_authorized(&self.http, self.credentials.as_ref(), || {
            self.http.request(Method::GET, &url).header(ACCEPT, "application/json").query(query)
        })
        .await?;

        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(|e| CalSyncError::from(InfraError::from(e)))?;
        serde_json::from_slice(&bytes).map_err(|e| CalSyncError::from(InfraError::from(e)))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    Err(CalSyncError::RemoteOperation(format!(
        "Qualer {} returned {}: {}",
        url.path(),
        status,
        body
    )))
}

#[async_trait]
impl WorkOrderSource for QualerClient {
    #[instrument(skip(self), fields(status = %self.work_order_status))]
    async fn fetch_work_orders(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<WorkOrder>> {
        let query = [
            ("status", self.work_order_status.clone()),
            ("from", start.format(QUERY_DATETIME_FORMAT).to_string()),
            ("to", end.format(QUERY_DATETIME_FORMAT).to_string()),
        ];
        let orders: Vec<WorkOrder> = self.get("/service/workorders", &query).await?;
        debug!(count = orders.len(), "fetched work orders");
        Ok(orders)
    }

    async fn count_assets(&self, service_order_id: &str) -> Result<usize> {
        let items: Vec<serde_json::Value> =
            self.get(&format!("/service/workorders/{service_order_id}/workitems"), &[]).await?;
        Ok(items.len())
    }

    async fn fetch_assignments(&self, service_order_id: &str) -> Result<Vec<Assignment>> {
        self.get(&format!("/service/workorders/{service_order_id}/assignments"), &[]).await
    }

    async fn fetch_attendee(&self, employee_id: &str) -> Result<Attendee> {
        let employee: Employee = self.get(&format!("/employees/{employee_id}"), &[]).await?;
        let address = employee.subscription_email.filter(|e| !e.trim().is_empty()).ok_or_else(|| {
            CalSyncError::RemoteOperation(format!(
                "employee {employee_id} has no subscription email"
            ))
        })?;

        let name = format!("{} {}", employee.first_name, employee.last_name).trim().to_string();
        Ok(Attendee::required(name, address))
    }
}

#[cfg(test)]
mod tests {
    use calsync_domain::OrderStatus;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::integrations::auth::QualerTokenProvider;

    fn config(base_url: String) -> QualerConfig {
        QualerConfig {
            base_url,
            username: "svc".into(),
            password: "pw".into(),
            work_order_status: "OnSite".into(),
            rate_limit_wait_secs: 0,
            max_attempts: 1,
        }
    }

    async fn client_for(server: &MockServer) -> QualerClient {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": "t-1" })))
            .mount(server)
            .await;

        let http = HttpClient::builder().max_attempts(1).build().unwrap();
        let config = config(server.uri());
        let credentials = Arc::new(QualerTokenProvider::new(http.clone(), &config));
        QualerClient::new(http, &config, credentials)
    }

    #[tokio::test]
    async fn fetches_work_orders_for_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/workorders"))
            .and(query_param("status", "OnSite"))
            .and(query_param("from", "2024-01-08T00:00:00.000000"))
            .and(query_param("to", "2024-01-15T00:00:00.000000"))
            .and(header("Authorization", "Api-Token t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "ServiceOrderId": 100,
                "CustomOrderNumber": "56561-000100",
                "OrderStatus": "Scheduling",
                "RequestFromDate": "2024-01-10T00:00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let start = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();

        let orders = client.fetch_work_orders(start, end).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].service_order_id.as_deref(), Some("100"));
        assert_eq!(orders[0].order_status, Some(OrderStatus::Scheduling));
    }

    #[tokio::test]
    async fn counts_work_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/workorders/100/workitems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{}, {}, {}])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.count_assets("100").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn resolves_employee_to_required_attendee() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/workorders/100/assignments"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "EmployeeId": 7, "Role": "Tech" }])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/employees/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "FirstName": "Pat",
                "LastName": "Doe",
                "SubscriptionEmail": "pat@example.com"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let assignments = client.fetch_assignments("100").await.unwrap();
        assert_eq!(assignments, vec![Assignment { employee_id: "7".into() }]);

        let attendee = client.fetch_attendee("7").await.unwrap();
        assert_eq!(attendee, Attendee::required("Pat Doe", "pat@example.com"));
    }

    #[tokio::test]
    async fn not_found_is_remote_operation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/employees/9"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such employee"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        match client.fetch_attendee("9").await {
            Err(CalSyncError::RemoteOperation(msg)) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("no such employee"));
            }
            other => panic!("expected remote operation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refreshes_token_once_after_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/workorders/100/workitems"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/service/workorders/100/workitems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{}])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.count_assets("100").await.unwrap(), 1);
    }
}
