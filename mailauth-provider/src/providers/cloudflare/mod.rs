//! Cloudflare managed DNS provider

mod error;
mod http;
mod provider;
mod types;

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;
use crate::http_client::RetryPolicy;
use crate::providers::common::{DEFAULT_REQUEST_TIMEOUT_SECS, create_http_client};
use crate::utils::log_sanitizer::mask_secret;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Maximum records per page of the DNS Records API
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;

/// Cloudflare managed DNS provider
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_base: String,
    pub(crate) account_id: String,
    pub(crate) api_token: String,
    pub(crate) retry: RetryPolicy,
}

/// Cloudflare provider builder
pub struct CloudflareProviderBuilder {
    account_id: String,
    api_token: String,
    api_base: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl CloudflareProviderBuilder {
    fn new(account_id: String, api_token: String) -> Self {
        Self {
            account_id,
            api_token,
            api_base: CF_API_BASE.to_string(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the API base URL (stub servers, API gateways).
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<CloudflareProvider> {
        log::debug!(
            "[cloudflare] Client for account {} with token {}",
            self.account_id,
            mask_secret(&self.api_token)
        );
        Ok(CloudflareProvider {
            client: create_http_client("cloudflare", self.timeout)?,
            api_base: self.api_base,
            account_id: self.account_id,
            api_token: self.api_token,
            retry: self.retry,
        })
    }
}

impl CloudflareProvider {
    pub fn new(account_id: String, api_token: String) -> Result<Self> {
        Self::builder(account_id, api_token).build()
    }

    pub fn builder(account_id: String, api_token: String) -> CloudflareProviderBuilder {
        CloudflareProviderBuilder::new(account_id, api_token)
    }
}
