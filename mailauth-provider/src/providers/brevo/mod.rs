//! Brevo transactional email provider (domains, senders, authentication)

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

pub(crate) use types::{
    BrevoApiError, BrevoAuthenticateResponse, BrevoCreateDomainResponse, BrevoCreateSenderResponse,
    BrevoDomainResponse,
};

pub(crate) const BREVO_API_BASE: &str = "https://api.brevo.com/v3";

/// Brevo sending provider
pub struct BrevoProvider {
    pub(crate) client: Client,
    pub(crate) api_base: String,
    pub(crate) api_key: String,
    pub(crate) retry: RetryPolicy,
}

/// Brevo provider builder
pub struct BrevoProviderBuilder {
    api_key: String,
    api_base: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl BrevoProviderBuilder {
    fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_base: BREVO_API_BASE.to_string(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<BrevoProvider> {
        log::debug!(
            "[brevo] Client for {} with key {}",
            self.api_base,
            mask_secret(&self.api_key)
        );
        Ok(BrevoProvider {
            client: create_http_client("brevo", self.timeout)?,
            api_base: self.api_base,
            api_key: self.api_key,
            retry: self.retry,
        })
    }
}

impl BrevoProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: String) -> BrevoProviderBuilder {
        BrevoProviderBuilder::new(api_key)
    }
}
