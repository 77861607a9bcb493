use std::time::Duration;

use calsync_domain::CalSyncError;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Which failures may be retried for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Safe to repeat: transport failures, 5xx, 429 and 503 are retried.
    #[default]
    Idempotent,
    /// Must not run twice: only 429 and connection failures, where the
    /// server never processed the request, are retried.
    ThrottleOnly,
}

impl RetryPolicy {
    fn retries_status(self, status: StatusCode) -> bool {
        match self {
            Self::Idempotent => is_throttled(status) || status.is_server_error(),
            Self::ThrottleOnly => status == StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn retries_error(self, err: &reqwest::Error) -> bool {
        match self {
            Self::Idempotent => should_retry_error(err),
            Self::ThrottleOnly => err.is_connect(),
        }
    }
}

/// HTTP client with built-in retry and timeout support.
///
/// Transport failures and 5xx responses are retried with exponential
/// backoff. Throttling (429) and unavailability (503) wait a fixed period,
/// or the server's `Retry-After`, before the next attempt. Once attempts run
/// out the last response is returned as-is.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
    throttle_wait: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, CalSyncError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, CalSyncError> {
        self.send_with_policy(builder, RetryPolicy::Idempotent).await
    }

    /// Execute a request that must not be repeated once the server may have
    /// acted on it.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Response, CalSyncError> {
        self.send_with_policy(builder, RetryPolicy::ThrottleOnly).await
    }

    pub async fn send_with_policy(
        &self,
        builder: RequestBuilder,
        policy: RetryPolicy,
    ) -> Result<Response, CalSyncError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                CalSyncError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                CalSyncError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");
            let has_next = attempt + 1 < attempts;

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if !(has_next && policy.retries_status(status)) {
                        return Ok(response);
                    }

                    if is_throttled(status) {
                        let wait = retry_after(&response).unwrap_or(self.throttle_wait);
                        warn!(
                            %status,
                            %url,
                            wait_secs = wait.as_secs_f64(),
                            "remote service throttled or unavailable; waiting before retry"
                        );
                        sleep(wait).await;
                        continue;
                    }

                    self.sleep_with_backoff(attempt + 1).await;
                }
                Err(err) => {
                    debug!(
                        attempt = attempt + 1,
                        %method,
                        %url,
                        error = %err,
                        "HTTP request failed"
                    );

                    if has_next && policy.retries_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    let infra: InfraError = err.into();
                    return Err(CalSyncError::from(infra));
                }
            }
        }

        Err(CalSyncError::Internal(
            "http client exhausted retries without producing a result".into(),
        ))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        sleep(self.backoff_delay(retry_number)).await;
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    throttle_wait: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_attempts: 5,
            base_backoff: Duration::from_millis(500),
            throttle_wait: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Wait applied after a 429/503 without a `Retry-After` header.
    pub fn throttle_wait(mut self, wait: Duration) -> Self {
        self.throttle_wait = wait;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, CalSyncError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            CalSyncError::from(infra)
        })?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
            throttle_wait: self.throttle_wait,
        })
    }
}

fn is_throttled(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

/// `Retry-After` in delay-seconds form; HTTP-date values are ignored.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
