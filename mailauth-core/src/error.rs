//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use mailauth_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Domain name failed syntax validation
    #[error("Invalid domain name '{name}': {reason}")]
    InvalidDomainName { name: String, reason: String },

    /// The account already has a domain with this name
    #[error("Domain {name} already exists for account {account_id}")]
    DomainAlreadyExists { account_id: String, name: String },

    /// Domain not found
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Sender identity not found
    #[error("Sender not found: {0}")]
    SenderNotFound(String),

    /// Sender address is malformed or does not belong to the domain
    #[error("Invalid sender address '{email}': {reason}")]
    InvalidSenderAddress { email: String, reason: String },

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Secret could not be decrypted or is missing
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// DNS resolution failed for a reason other than "no such record"
    #[error("DNS lookup failed for {name}: {detail}")]
    DnsLookupFailed { name: String, detail: String },

    /// An external call exceeded its time budget
    #[error("Operation timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    /// DKIM key pair generation failed
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Managed-DNS mode requested without a configured zone provider
    #[error("No managed DNS provider is configured")]
    MissingZoneProvider,

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidDomainName { .. }
            | Self::DomainAlreadyExists { .. }
            | Self::DomainNotFound(_)
            | Self::SenderNotFound(_)
            | Self::InvalidSenderAddress { .. }
            | Self::ValidationError(_)
            | Self::MissingZoneProvider => true,
            Self::Provider(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
