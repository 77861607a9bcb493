//! Credential providers for the remote platforms.
//!
//! Each provider caches one credential (the full `Authorization` header
//! value) and replaces it on demand. Clients call [`CredentialProvider::refresh`]
//! once after a 401 and retry; a second 401 is reported as an auth error.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use calsync_domain::{CalSyncError, OutlookConfig, QualerConfig, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::InfraError;
use crate::http::{HttpClient, RetryPolicy};

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Tokens are renewed this long before Graph says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current `Authorization` header value, acquiring one when none is cached.
    async fn credential(&self) -> Result<String>;

    /// Drop the cached credential and acquire a fresh one.
    async fn refresh(&self) -> Result<String>;
}

/// Send a request with the current credential, refreshing it once on a 401.
///
/// `build` is called once per attempt so the request can be rebuilt with the
/// new `Authorization` header.
pub async fn send_authorized<F>(
    http: &HttpClient,
    credentials: &dyn CredentialProvider,
    build: F,
) -> Result<Response>
where
    F: Fn() -> RequestBuilder + Send + Sync,
{
    send_authorized_with(http, credentials, RetryPolicy::Idempotent, build).await
}

/// [`send_authorized`] with an explicit retry policy for the transport.
pub async fn send_authorized_with<F>(
    http: &HttpClient,
    credentials: &dyn CredentialProvider,
    policy: RetryPolicy,
    build: F,
) -> Result<Response>
where
    F: Fn() -> RequestBuilder + Send + Sync,
{
    let header = credentials.credential().await?;
    let response = http.send_with_policy(build().header(AUTHORIZATION, header), policy).await?;
    if response.status() != StatusCode::UNAUTHORIZED {
        return Ok(response);
    }

    warn!(url = %response.url(), "credential rejected; refreshing and retrying once");
    let header = credentials.refresh().await?;
    let response = http.send_with_policy(build().header(AUTHORIZATION, header), policy).await?;
    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(CalSyncError::Auth(format!(
            "{} rejected a freshly issued credential",
            response.url()
        )));
    }
    Ok(response)
}

#[derive(Debug, Clone)]
struct CachedToken {
    header: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() + EXPIRY_MARGIN < at)
    }
}

/// OAuth2 client-credentials flow against the Microsoft identity platform.
pub struct GraphTokenProvider {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
struct GraphTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl GraphTokenProvider {
    pub fn new(http: HttpClient, config: &OutlookConfig) -> Self {
        Self {
            http,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                config.login_base_url.trim_end_matches('/'),
                config.tenant_id
            ),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cached: Mutex::new(None),
        }
    }

    async fn acquire(&self) -> Result<CachedToken> {
        let request = self.http.request(Method::POST, &self.token_url).form(&[
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
        ]);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalSyncError::Auth(format!(
                "Outlook token request failed ({status}): {body}"
            )));
        }

        let token: GraphTokenResponse =
            response.json().await.map_err(|e| CalSyncError::from(InfraError::from(e)))?;
        info!(expires_in = ?token.expires_in, "acquired Outlook access token");

        Ok(CachedToken {
            header: format!("Bearer {}", token.access_token),
            expires_at: token.expires_in.map(|secs| Instant::now() + Duration::from_secs(secs)),
        })
    }
}

#[async_trait]
impl CredentialProvider for GraphTokenProvider {
    async fn credential(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.header.clone());
        }
        let token = self.acquire().await?;
        let header = token.header.clone();
        *cached = Some(token);
        Ok(header)
    }

    async fn refresh(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        debug!("refreshing Outlook access token");
        let token = self.acquire().await?;
        let header = token.header.clone();
        *cached = Some(token);
        Ok(header)
    }
}

/// Username/password login issuing a Qualer API token.
pub struct QualerTokenProvider {
    http: HttpClient,
    login_url: String,
    username: String,
    password: String,
    cached: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QualerLoginResponse {
    token: String,
}

impl QualerTokenProvider {
    pub fn new(http: HttpClient, config: &QualerConfig) -> Self {
        Self {
            http,
            login_url: format!("{}/login", config.base_url.trim_end_matches('/')),
            username: config.username.clone(),
            password: config.password.clone(),
            cached: Mutex::new(None),
        }
    }

    async fn login(&self) -> Result<String> {
        let request = self
            .http
            .request(Method::POST, &self.login_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({
                "UserName": self.username,
                "Password": self.password,
                "ClearPreviousTokens": "False",
            }));

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalSyncError::Auth(format!("Qualer login failed ({status}): {body}")));
        }

        let login: QualerLoginResponse = response
            .json()
            .await
            .map_err(|e| CalSyncError::Auth(format!("Qualer login returned no token: {e}")))?;
        info!("generated Qualer API token");
        Ok(format!("Api-Token {}", login.token))
    }
}

#[async_trait]
impl CredentialProvider for QualerTokenProvider {
    async fn credential(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.login().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn refresh(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        debug!("refreshing Qualer API token");
        let token = self.login().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}
