//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use calsync_domain::CalSyncError;
use calsync_infra::config;
use tempfile::Builder;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "qualer": {
            "base_url": "https://qualer.example.com/api",
            "username": "svc-calendar",
            "password": "hunter2",
            "max_attempts": 3
        },
        "outlook": {
            "tenant_id": "tenant",
            "client_id": "client",
            "client_secret": "secret",
            "user_id": "sysop@example.com",
            "calendar_id": "AAMkAGEw"
        },
        "sync": {
            "window_days": 7,
            "time_zone": "America/Chicago",
            "checkpoint_path": "/var/lib/calsync/checkpoint.log"
        }
    }"#;

    let mut temp_file = Builder::new().suffix(".json").tempfile().expect("temp file");
    temp_file.write_all(json_content.as_bytes()).expect("write config");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf())).expect("config");

    assert_eq!(config.qualer.base_url, "https://qualer.example.com/api");
    assert_eq!(config.qualer.max_attempts, 3);
    assert_eq!(config.qualer.rate_limit_wait_secs, 30);
    assert_eq!(config.outlook.calendar_id, "AAMkAGEw");
    assert_eq!(config.sync.checkpoint_path, PathBuf::from("/var/lib/calsync/checkpoint.log"));
    assert_eq!(config.sync.body_template_path, PathBuf::from("app/body.html"));
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[qualer]
base_url = "https://qualer.example.com/api"
username = "svc-calendar"
password = "hunter2"

[outlook]
tenant_id = "tenant"
client_id = "client"
client_secret = "secret"
user_id = "sysop@example.com"
calendar_id = "AAMkAGEw"
page_size = 250

[sync]
dry_run = true
order_number_prefix = "12345"
"#;

    let mut temp_file = Builder::new().suffix(".toml").tempfile().expect("temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("write config");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf())).expect("config");

    assert_eq!(config.outlook.page_size, 250);
    assert!(config.sync.dry_run);
    assert_eq!(config.sync.order_number_prefix, "12345");
    assert_eq!(config.sync.window_days, 7);
}

#[test]
fn test_missing_section_is_config_error() {
    let mut temp_file = Builder::new().suffix(".json").tempfile().expect("temp file");
    temp_file
        .write_all(br#"{ "qualer": { "base_url": "https://q/api", "username": "u" } }"#)
        .expect("write config");

    let result = config::load_from_file(Some(temp_file.path().to_path_buf()));
    assert!(matches!(result, Err(CalSyncError::Config(_))));
}
