use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A validated, lowercase, fully-qualified domain name without trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Parse and normalise a domain name (RFC 1035 label rules).
    pub fn parse(input: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidDomainName {
            name: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let name = trimmed.strip_suffix('.').unwrap_or(trimmed).to_ascii_lowercase();

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(invalid("name is longer than 253 characters"));
        }

        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() < 2 {
            return Err(invalid("name must have at least two labels"));
        }

        for label in &labels {
            if label.is_empty() {
                return Err(invalid("empty label"));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(invalid("label is longer than 63 characters"));
            }
            if !label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            {
                return Err(invalid("labels may contain only letters, digits and '-'"));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(invalid("labels may not start or end with '-'"));
            }
        }

        if labels
            .last()
            .is_some_and(|tld| tld.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(invalid("top-level label may not be numeric"));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DomainName {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

/// Who hosts the domain's DNS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DnsOwnership {
    /// The platform hosts the zone at the managed DNS provider.
    Managed,
    /// The customer publishes the records at their own DNS host.
    Manual,
}

/// Lifecycle status of a domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pending,
    Active,
    Failed,
    Expired,
}

impl DomainStatus {
    /// Terminal domains are no longer reconciled.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Expired)
    }
}

/// Verification status of a domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    /// Previously verified, proof currently missing.
    Pending,
    Verified,
}

/// A customer-owned sending domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub account_id: String,
    pub name: DomainName,
    pub ownership: DnsOwnership,
    pub status: DomainStatus,
    pub verification_status: VerificationStatus,
    pub spf_verified: bool,
    pub dkim_verified: bool,
    pub dmarc_verified: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Start of the current unverified stretch: creation, or the last demotion.
    pub pending_since: DateTime<Utc>,
}

impl Domain {
    /// A freshly created domain: `pending` / `unverified`.
    pub fn new(account_id: impl Into<String>, name: DomainName, ownership: DnsOwnership) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.into(),
            name,
            ownership,
            status: DomainStatus::Pending,
            verification_status: VerificationStatus::Unverified,
            spf_verified: false,
            dkim_verified: false,
            dmarc_verified: false,
            last_checked_at: None,
            created_at: now,
            pending_since: now,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    /// Whether the domain has stayed unverified for the whole expiry window.
    ///
    /// The window restarts when a verified domain is demoted.
    pub fn is_expired_at(&self, now: DateTime<Utc>, expiry: chrono::Duration) -> bool {
        !self.is_verified() && now - self.pending_since >= expiry
    }

    /// Apply a verification update in place.
    pub fn apply(&mut self, update: &DomainVerificationUpdate) {
        if self.is_verified() && update.verification_status != VerificationStatus::Verified {
            self.pending_since = update.last_checked_at;
        }
        self.spf_verified = update.spf_verified;
        self.dkim_verified = update.dkim_verified;
        self.dmarc_verified = update.dmarc_verified;
        self.verification_status = update.verification_status;
        self.status = update.status;
        self.last_checked_at = Some(update.last_checked_at);
    }
}

/// Fields written back after a verification pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainVerificationUpdate {
    pub spf_verified: bool,
    pub dkim_verified: bool,
    pub dmarc_verified: bool,
    pub verification_status: VerificationStatus,
    pub status: DomainStatus,
    pub last_checked_at: DateTime<Utc>,
}

impl DomainVerificationUpdate {
    /// Whether writing this update would change anything but the timestamp.
    pub fn changes(&self, domain: &Domain) -> bool {
        self.spf_verified != domain.spf_verified
            || self.dkim_verified != domain.dkim_verified
            || self.dmarc_verified != domain.dmarc_verified
            || self.verification_status != domain.verification_status
            || self.status != domain.status
            || domain.last_checked_at.is_none()
    }
}
