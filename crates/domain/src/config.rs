//! Configuration management

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ORDER_NUMBER_PREFIX, DEFAULT_SERVICE_ORDER_URL, DEFAULT_TIME_ZONE,
    DEFAULT_WINDOW_DAYS, DEFAULT_WORK_ORDER_STATUS,
};
use crate::{CalSyncError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub qualer: QualerConfig,
    pub outlook: OutlookConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    /// Validate cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.qualer.base_url.trim().is_empty() {
            return Err(CalSyncError::Config("qualer.base_url must not be empty".into()));
        }
        if self.outlook.calendar_id.trim().is_empty() {
            return Err(CalSyncError::Config("outlook.calendar_id must not be empty".into()));
        }
        self.sync.validate()
    }
}

/// Work-order source (Qualer) connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualerConfig {
    pub base_url: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default = "default_work_order_status")]
    pub work_order_status: String,
    #[serde(default = "default_rate_limit_wait_secs")]
    pub rate_limit_wait_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

/// Calendar target (Microsoft Graph) connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlookConfig {
    pub tenant_id: String,
    pub client_id: String,
    #[serde(skip_serializing, default)]
    pub client_secret: String,
    pub user_id: String,
    pub calendar_id: String,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_login_base_url")]
    pub login_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Reconciliation behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_order_number_prefix")]
    pub order_number_prefix: String,
    #[serde(default = "default_service_order_url")]
    pub service_order_url: String,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_body_template_path")]
    pub body_template_path: PathBuf,
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,
}

impl SyncConfig {
    /// Parse the configured time zone name.
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| CalSyncError::Config(format!("Invalid time zone {}: {}", self.time_zone, e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_days == 0 {
            return Err(CalSyncError::Config("sync.window_days must be at least 1".into()));
        }
        if self.order_number_prefix.trim().is_empty() {
            return Err(CalSyncError::Config("sync.order_number_prefix must not be empty".into()));
        }
        self.tz().map(|_| ())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            time_zone: default_time_zone(),
            order_number_prefix: default_order_number_prefix(),
            service_order_url: default_service_order_url(),
            dry_run: false,
            body_template_path: default_body_template_path(),
            checkpoint_path: default_checkpoint_path(),
        }
    }
}

fn default_work_order_status() -> String {
    DEFAULT_WORK_ORDER_STATUS.to_string()
}

fn default_rate_limit_wait_secs() -> u64 {
    30
}

fn default_max_attempts() -> usize {
    5
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_login_base_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_order_number_prefix() -> String {
    DEFAULT_ORDER_NUMBER_PREFIX.to_string()
}

fn default_service_order_url() -> String {
    DEFAULT_SERVICE_ORDER_URL.to_string()
}

fn default_body_template_path() -> PathBuf {
    PathBuf::from("app/body.html")
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("app/checkpoint.log")
}
