//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `CALSYNC_QUALER_BASE_URL`: Qualer API root (e.g. `https://host/api`)
//! - `QUALER_USER`, `QUALER_PASSWORD`: Qualer login
//! - `CALSYNC_OUTLOOK_TENANT_ID`, `CALSYNC_OUTLOOK_CLIENT_ID`,
//!   `CALSYNC_OUTLOOK_CLIENT_SECRET`: Azure app registration
//! - `CALSYNC_OUTLOOK_USER_ID`: mailbox owning the calendar
//! - `CALSYNC_OUTLOOK_CALENDAR_ID`: calendar to reconcile
//!
//! Optional:
//! - `CALSYNC_DRY_RUN`: log writes instead of performing them (true/false)
//! - `CALSYNC_WINDOW_DAYS`: width of each fetch window in days
//! - `CALSYNC_TIME_ZONE`: IANA zone of the calendar
//! - `CALSYNC_CHECKPOINT_PATH`: run log holding the last checkpoint
//! - `CALSYNC_BODY_TEMPLATE_PATH`: HTML template for event bodies
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./calsync.json` or `./calsync.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use calsync_domain::{CalSyncError, Config, OutlookConfig, QualerConfig, Result, SyncConfig};

/// Environment variables that must all be set for env-only configuration.
pub const REQUIRED_ENV_VARS: [&str; 8] = [
    "CALSYNC_QUALER_BASE_URL",
    "QUALER_USER",
    "QUALER_PASSWORD",
    "CALSYNC_OUTLOOK_TENANT_ID",
    "CALSYNC_OUTLOOK_CLIENT_ID",
    "CALSYNC_OUTLOOK_CLIENT_SECRET",
    "CALSYNC_OUTLOOK_USER_ID",
    "CALSYNC_OUTLOOK_CALENDAR_ID",
];

/// Load configuration with automatic fallback strategy
///
/// Uses environment variables when every required one is set; invalid
/// values there are reported as-is. Otherwise falls back to a config file.
///
/// # Errors
/// Returns `CalSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load() -> Result<Config> {
    let missing: Vec<&str> =
        REQUIRED_ENV_VARS.iter().copied().filter(|key| std::env::var(key).is_err()).collect();

    if missing.is_empty() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!(missing = ?missing, "Required environment variables unset, trying file");
    load_from_file(None)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `CalSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let qualer = QualerConfig {
        base_url: env_var("CALSYNC_QUALER_BASE_URL")?,
        username: env_var("QUALER_USER")?,
        password: env_var("QUALER_PASSWORD")?,
        work_order_status: calsync_domain::constants::DEFAULT_WORK_ORDER_STATUS.to_string(),
        rate_limit_wait_secs: 30,
        max_attempts: 5,
    };

    let outlook = OutlookConfig {
        tenant_id: env_var("CALSYNC_OUTLOOK_TENANT_ID")?,
        client_id: env_var("CALSYNC_OUTLOOK_CLIENT_ID")?,
        client_secret: env_var("CALSYNC_OUTLOOK_CLIENT_SECRET")?,
        user_id: env_var("CALSYNC_OUTLOOK_USER_ID")?,
        calendar_id: env_var("CALSYNC_OUTLOOK_CALENDAR_ID")?,
        graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
        login_base_url: "https://login.microsoftonline.com".to_string(),
        page_size: 1000,
    };

    let mut sync =
        SyncConfig { dry_run: env_bool("CALSYNC_DRY_RUN", false), ..SyncConfig::default() };
    if let Some(days) = env_opt("CALSYNC_WINDOW_DAYS") {
        sync.window_days = days
            .parse::<u32>()
            .map_err(|e| CalSyncError::Config(format!("Invalid window days: {}", e)))?;
    }
    if let Some(zone) = env_opt("CALSYNC_TIME_ZONE") {
        sync.time_zone = zone;
    }
    if let Some(path) = env_opt("CALSYNC_CHECKPOINT_PATH") {
        sync.checkpoint_path = PathBuf::from(path);
    }
    if let Some(path) = env_opt("CALSYNC_BODY_TEMPLATE_PATH") {
        sync.body_template_path = PathBuf::from(path);
    }

    let config = Config { qualer, outlook, sync };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CalSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CalSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CalSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CalSyncError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, format detected by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CalSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CalSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CalSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
        candidates.push(cwd.join("../config.json"));
        candidates.push(cwd.join("../config.toml"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    ["calsync.json", "calsync.toml", "config.json", "config.toml"]
        .iter()
        .map(|name| dir.join(name))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `CalSyncError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CalSyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; blank values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
