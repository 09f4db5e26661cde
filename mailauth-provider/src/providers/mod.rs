//! Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

#[cfg(feature = "brevo")]
mod brevo;
#[cfg(feature = "cloudflare")]
mod cloudflare;

#[cfg(feature = "brevo")]
pub use brevo::{BrevoProvider, BrevoProviderBuilder};
#[cfg(feature = "cloudflare")]
pub use cloudflare::{CloudflareProvider, CloudflareProviderBuilder};
