//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for calsync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalSyncError {
    /// The order lacks the fields needed to schedule it.
    #[error("Order is missing values: {}.", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// End precedes start and the AM/PM correction does not apply.
    #[error("Order ends before it starts. Make manual corrections on Qualer: {url}")]
    InvertedRange { service_order_id: String, url: String },

    /// A collaborator call failed after its own retry policy was exhausted.
    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),

    /// No previous run timestamp is available.
    #[error("No checkpoint available: {0}")]
    NoCheckpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CalSyncError {
    /// Build a [`CalSyncError::MissingFields`] from field names.
    pub fn missing_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingFields { fields: fields.into_iter().map(Into::into).collect() }
    }

    /// Errors that abort a run before any order is processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoCheckpoint(_) | Self::Config(_))
    }
}

/// Result type alias for calsync operations
pub type Result<T> = std::result::Result<T, CalSyncError>;
