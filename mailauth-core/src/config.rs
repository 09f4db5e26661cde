//! Platform settings consumed by the checkers and services

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Complaints after which a sender is disabled.
pub const COMPLAINT_DISABLE_THRESHOLD: u32 = 3;

/// Reason recorded when a sender crosses [`COMPLAINT_DISABLE_THRESHOLD`].
pub const COMPLAINT_DISABLE_REASON: &str = "Disabled automatically: complaint threshold reached";

/// Inbound MX record published for customer domains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MxConfig {
    pub host: String,
    #[serde(default = "default_mx_priority")]
    pub priority: u16,
}

fn default_mx_priority() -> u16 {
    10
}

/// What the platform requires from a customer's DNS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlatformConfig {
    /// Domain that must appear as `include:` in the customer's SPF record.
    pub spf_include: String,
    /// Hostname marker a delegated DKIM CNAME target must contain.
    pub dkim_cname_marker: String,
    /// Selector checked when none was recorded at provisioning time.
    pub default_dkim_selector: String,
    /// TTL of records written to managed zones.
    pub record_ttl: u32,
    pub mx: Option<MxConfig>,
    pub dns_timeout_secs: u64,
    /// Upper bound for one provider call, retries included.
    pub provider_timeout_secs: u64,
    /// Unverified domains older than this are marked failed.
    pub pending_expiry_hours: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            spf_include: "spf.brevo.com".to_string(),
            dkim_cname_marker: "dkim.brevo.com".to_string(),
            default_dkim_selector: "brevo1".to_string(),
            record_ttl: 3600,
            mx: None,
            dns_timeout_secs: 5,
            provider_timeout_secs: 60,
            pending_expiry_hours: 168,
        }
    }
}

impl PlatformConfig {
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn pending_expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.pending_expiry_hours))
    }
}

/// Reconciliation schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReconcileConfig {
    pub interval_secs: u64,
    /// Budget for one domain within a pass; exceeding it fails that domain only.
    pub per_domain_timeout_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            per_domain_timeout_secs: 30,
        }
    }
}

impl ReconcileConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn per_domain_timeout(&self) -> Duration {
        Duration::from_secs(self.per_domain_timeout_secs)
    }
}
