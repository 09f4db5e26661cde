//! Generic HTTP client tools
//!
//! Reusable request execution shared by every provider client. Each provider builds its own
//! `RequestBuilder` (auth headers, body) and maps API-level error payloads itself; this module
//! owns the transport concerns only.
//!
//! # design principles
//! - **Unified HTTP processing flow** - sending requests, logging, reading responses
//! - **Transport errors are typed here** - timeouts, 429 and 5xx never reach provider parsers
//! - **Retry is an explicit bounded loop** - attempt count and delay are computed, never recursive

use std::future::Future;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Upper bound for a provider-supplied `Retry-After`.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Bounded exponential-backoff policy for transient provider failures.
///
/// The delay before retry `n` (0-based) is `base_delay * 2^n`, so the default policy waits
/// 1s, 2s and 4s before giving up after the fourth attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 disables retrying).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that performs exactly one attempt.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Exponential backoff delay for the given 0-based retry attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        // Keep 2^attempt from overflowing
        let factor = 1_u32 << attempt.min(16);
        self.base_delay.saturating_mul(factor)
    }

    /// Delay to wait after `error` on the given attempt.
    ///
    /// A `RateLimited` error carrying `retry_after` uses that value (capped at 30s).
    pub fn retry_delay(&self, error: &ProviderError, attempt: u32) -> Duration {
        if let ProviderError::RateLimited {
            retry_after: Some(secs),
            ..
        } = error
        {
            Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
        } else {
            self.backoff_delay(attempt)
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy's retries are used up.
///
/// Only errors for which [`ProviderError::is_retryable`] holds are retried. The last error is
/// returned once `max_retries` retries have failed.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    provider_name: &str,
    label: &str,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && e.is_retryable() => {
                let delay = policy.retry_delay(&e, attempt);
                log::warn!(
                    "[{}] {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                    provider_name,
                    label,
                    attempt + 1,
                    policy.max_retries + 1,
                    delay.as_secs_f32(),
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns status code plus response text
    ///
    /// Unified processing: sending requests, logging, transport error handling.
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - for 2xx and 4xx answers (4xx bodies are
    ///   mapped by the provider)
    /// * `Err(ProviderError::Timeout | NetworkError)` - transport failure
    /// * `Err(ProviderError::RateLimited)` - HTTP 429
    /// * `Err(ProviderError::ServerError)` - HTTP 5xx
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url_or_action}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] Response Status: {status_code}");

        // Read before the body is consumed
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                raw_message: Some(truncate_for_log(&body)),
            });
        }

        if status_code >= 500 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Server error (HTTP {status_code})");
            return Err(ProviderError::ServerError {
                provider: provider_name.to_string(),
                status: status_code,
                detail: truncate_for_log(&body),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Parse JSON response
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(ProviderError::ParseError)` - parsing failed
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{provider_name}] JSON parse failed: {e}");
            log::error!(
                "[{provider_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Performs an HTTP request with [`retry_with_backoff`]
    ///
    /// The request is cloned for every attempt (`RequestBuilder` is single-use). A request
    /// whose body cannot be cloned is sent once without retrying.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
        policy: &RetryPolicy,
    ) -> Result<(u16, String), ProviderError> {
        if policy.max_retries == 0 || request_builder.try_clone().is_none() {
            return Self::execute_request(
                request_builder,
                provider_name,
                method_name,
                url_or_action,
            )
            .await;
        }

        let label = format!("{method_name} {url_or_action}");
        retry_with_backoff(policy, provider_name, &label, || {
            let attempt = request_builder.try_clone();
            async move {
                let req = attempt.ok_or_else(|| ProviderError::SerializationError {
                    provider: provider_name.to_string(),
                    detail: "request body cannot be cloned".to_string(),
                })?;
                Self::execute_request(req, provider_name, method_name, url_or_action).await
            }
        })
        .await
    }
}
