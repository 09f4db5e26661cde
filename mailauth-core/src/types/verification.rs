use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mailauth_provider::{MechanismStatus, SendingDomainStatus};

/// Outcome of the SPF check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpfResult {
    pub valid: bool,
    /// The `v=spf1` record that was evaluated.
    pub record: Option<String>,
    pub reason: String,
    /// The record carries the platform's `include:` mechanism.
    pub includes_platform: bool,
}

/// How a DKIM selector is published.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DkimRecordType {
    /// Delegated to the platform.
    Cname,
    /// Public key published by the customer.
    Txt,
}

/// Outcome of the DKIM check for one selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DkimResult {
    pub valid: bool,
    pub selector: String,
    /// CNAME target or concatenated TXT value.
    pub record: Option<String>,
    pub record_type: Option<DkimRecordType>,
    pub reason: String,
}

/// DMARC `p=` / `sp=` values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DmarcPolicy {
    None,
    Quarantine,
    Reject,
}

impl DmarcPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "quarantine" => Some(Self::Quarantine),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Quarantine => "quarantine",
            Self::Reject => "reject",
        }
    }

    /// `quarantine` and `reject` act on failing mail; `none` only monitors.
    pub fn is_enforcing(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// DMARC identifier alignment mode (`adkim`, `aspf`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Relaxed,
    Strict,
}

/// Tags recognised in a DMARC record. Anything else is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DmarcTags {
    pub policy: Option<DmarcPolicy>,
    pub subdomain_policy: Option<DmarcPolicy>,
    pub pct: Option<u8>,
    pub rua: Vec<String>,
    pub ruf: Vec<String>,
    pub adkim: Option<Alignment>,
    pub aspf: Option<Alignment>,
}

/// Outcome of the DMARC check. Advisory only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DmarcResult {
    pub valid: bool,
    pub record: Option<String>,
    pub policy: Option<DmarcPolicy>,
    pub reporting_enabled: bool,
    pub reason: String,
    pub tags: Option<DmarcTags>,
}

/// What the sending provider reported during a pass.
///
/// Kept apart from the DNS result: the two can disagree while records propagate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCheck {
    pub verified: bool,
    pub authenticated: bool,
    pub mechanisms: MechanismStatus,
    /// Set when the provider could not be queried.
    pub error: Option<String>,
}

impl ProviderCheck {
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            verified: false,
            authenticated: false,
            mechanisms: MechanismStatus::default(),
            error: Some(error.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

impl From<SendingDomainStatus> for ProviderCheck {
    fn from(status: SendingDomainStatus) -> Self {
        Self {
            verified: status.verified,
            authenticated: status.authenticated,
            mechanisms: status.mechanisms,
            error: None,
        }
    }
}

/// Result of one orchestrated verification pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationPass {
    pub domain: String,
    pub spf: SpfResult,
    pub dkim: DkimResult,
    pub dmarc: DmarcResult,
    /// `spf.valid && dkim.valid`. DMARC never contributes.
    pub overall_valid: bool,
    pub provider: ProviderCheck,
    pub checked_at: DateTime<Utc>,
}

impl VerificationPass {
    pub fn new(
        domain: impl Into<String>,
        spf: SpfResult,
        dkim: DkimResult,
        dmarc: DmarcResult,
        provider: ProviderCheck,
    ) -> Self {
        let overall_valid = spf.valid && dkim.valid;
        Self {
            domain: domain.into(),
            spf,
            dkim,
            dmarc,
            overall_valid,
            provider,
            checked_at: Utc::now(),
        }
    }
}
