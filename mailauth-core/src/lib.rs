//! Mail Authentication Core Library
//!
//! Platform-independent verification engine for customer sending domains:
//! - SPF / DKIM / DMARC checkers over a pluggable DNS resolver
//! - Provisioning of managed zones and sending-provider identities
//! - Verification state machine and the scheduled reconciliation job
//! - Sender registration, authorization and complaint-based reputation
//!
//! Storage is abstracted through the repository traits; the platform layer injects its
//! implementations through [`ServiceContext`].

pub mod checks;
pub mod config;
pub mod dkim_keys;
pub mod dns;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::{PlatformConfig, ReconcileConfig};
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{DomainRepository, SecretDecryptor, SenderRepository};
