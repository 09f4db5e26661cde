//! Shared helpers for the provider integration tests

#![allow(dead_code)]

use std::time::Duration;

use mailauth_provider::RetryPolicy;
use wiremock::{MockServer, ResponseTemplate};

/// JSON response with the given status.
pub fn json(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_owned(), "application/json")
}

/// `"METHOD /path"` of every request the server received, in order.
pub async fn hits(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

/// Retry policy with the production attempt count but millisecond delays.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(5))
}
