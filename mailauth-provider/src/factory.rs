//! Provider factory functions.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ProviderError, Result};
use crate::http_client::RetryPolicy;
use crate::traits::{DnsZoneProvider, SendingProvider};
use crate::types::ProviderCredentials;

#[cfg(feature = "brevo")]
use crate::providers::BrevoProvider;
#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareProvider;

/// Transport settings applied to every provider built by the factory.
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

fn wrong_kind(credentials: &ProviderCredentials, expected: &str) -> ProviderError {
    ProviderError::InvalidParameter {
        provider: credentials.provider_name().to_string(),
        param: "credentials".to_string(),
        detail: format!("{} is not a {expected} provider", credentials.provider_name()),
    }
}

/// Creates a [`DnsZoneProvider`] from managed-DNS credentials.
///
/// # Examples
///
/// ```rust,no_run
/// use mailauth_provider::{ClientOptions, ProviderCredentials, create_zone_provider};
///
/// let provider = create_zone_provider(
///     ProviderCredentials::Cloudflare {
///         account_id: "acc".to_string(),
///         api_token: "your-token".to_string(),
///     },
///     ClientOptions::default(),
/// ).unwrap();
/// ```
pub fn create_zone_provider(
    credentials: ProviderCredentials,
    options: ClientOptions,
) -> Result<Arc<dyn DnsZoneProvider>> {
    match credentials {
        #[cfg(feature = "cloudflare")]
        ProviderCredentials::Cloudflare {
            account_id,
            api_token,
        } => Ok(Arc::new(
            CloudflareProvider::builder(account_id, api_token)
                .timeout(options.timeout)
                .retry_policy(options.retry)
                .build()?,
        )),
        #[allow(unreachable_patterns)]
        other => Err(wrong_kind(&other, "managed DNS")),
    }
}

/// Creates a [`SendingProvider`] from transactional-email credentials.
pub fn create_sending_provider(
    credentials: ProviderCredentials,
    options: ClientOptions,
) -> Result<Arc<dyn SendingProvider>> {
    match credentials {
        #[cfg(feature = "brevo")]
        ProviderCredentials::Brevo { api_key } => Ok(Arc::new(
            BrevoProvider::builder(api_key)
                .timeout(options.timeout)
                .retry_policy(options.retry)
                .build()?,
        )),
        #[allow(unreachable_patterns)]
        other => Err(wrong_kind(&other, "sending")),
    }
}
