//! HTTP transport shared by the remote collaborators

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};
