//! Remote platform integrations

pub mod auth;
pub mod outlook;
pub mod qualer;

pub use auth::{
    send_authorized, send_authorized_with, CredentialProvider, GraphTokenProvider,
    QualerTokenProvider,
};
pub use outlook::GraphCalendarClient;
pub use qualer::QualerClient;
