//! # calsync Infrastructure
//!
//! Infrastructure implementations of core reconciliation ports.
//!
//! This crate contains:
//! - HTTP client with retry and throttling support
//! - Qualer (work orders) and Microsoft Graph (calendar) clients
//! - Run-log checkpoint storage, HTML body rendering and the system clock
//! - Configuration loading and cron scheduling
//!
//! ## Architecture
//! - Implements traits defined in `calsync-core`
//! - Contains all "impure" code (network, files, wall clock)

pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod scheduling;
pub mod template;

// Re-export commonly used items
pub use checkpoint::LogCheckpointStore;
pub use clock::SystemClock;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RetryPolicy};
pub use integrations::{
    CredentialProvider, GraphCalendarClient, GraphTokenProvider, QualerClient, QualerTokenProvider,
};
pub use template::TemplateBodyRenderer;
