//! # mailauth-provider
//!
//! Clients for the two external systems that take part in proving a customer domain may
//! send mail through the platform.
//!
//! ## Supported Providers
//!
//! | Provider | Role | Feature Flag | Auth Method |
//! |----------|------|-------------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | Managed DNS zones ([`DnsZoneProvider`]) | `cloudflare` | Bearer Token |
//! | [Brevo](https://www.brevo.com/) | Sending domains and senders ([`SendingProvider`]) | `brevo` | `api-key` header |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: enable every provider above.
//! - **`native-tls`** *(default)* / **`rustls`**: TLS backend for reqwest.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mailauth_provider::{
//!     create_sending_provider, ClientOptions, ProviderCredentials, SendingProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_sending_provider(
//!         ProviderCredentials::Brevo { api_key: "xkeysib-...".to_string() },
//!         ClientOptions::default(),
//!     )?;
//!
//!     let identity = provider.register_domain("example.com").await?;
//!     for record in &identity.dns_records {
//!         println!("{} {} {}", record.record_type, record.host, record.value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError). Transient failures
//! (`NetworkError`, `Timeout`, `RateLimited`, `ServerError`) are retried by the HTTP layer
//! according to the client's [`RetryPolicy`]; everything else fails on the first attempt.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

pub use factory::{ClientOptions, create_sending_provider, create_zone_provider};

pub use http_client::{RetryPolicy, retry_with_backoff};

// Internal traits (error mapping) are not exported
pub use traits::{DnsZoneProvider, SendingProvider};

pub use types::{
    BatchCreateFailure, BatchCreateResult, CreateRecordOutcome, CreateZoneRecordRequest,
    DnsRecordType, MechanismStatus, ProviderCredentials, RecordPurpose, RequiredDnsRecord,
    SenderRegistration, SendingDomainIdentity, SendingDomainStatus, Zone, ZoneRecord, ZoneStatus,
    dkim_selector_from_host,
};

pub use utils::log_sanitizer;

#[cfg(feature = "brevo")]
pub use providers::{BrevoProvider, BrevoProviderBuilder};

#[cfg(feature = "cloudflare")]
pub use providers::{CloudflareProvider, CloudflareProviderBuilder};
