use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mailauth_provider::ZoneStatus;

/// Link between a managed-mode domain and its zone at the DNS provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedZoneBinding {
    pub domain_id: String,
    pub zone_id: String,
    pub name_servers: Vec<String>,
    pub sync_status: ZoneStatus,
    /// All required records were accepted by the zone provider.
    pub records_published: bool,
    pub last_synced_at: DateTime<Utc>,
}

/// Link between a domain and its identity at the sending provider.
///
/// Exists for every domain regardless of DNS ownership mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentityBinding {
    pub domain_id: String,
    /// Provider-side reference, once the domain is registered.
    pub reference: Option<String>,
    pub provider_verified: bool,
    pub provider_authenticated: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl ProviderIdentityBinding {
    pub fn new(domain_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            reference: None,
            provider_verified: false,
            provider_authenticated: false,
            last_checked_at: None,
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &ProviderBindingUpdate) {
        if let Some(ref reference) = update.reference {
            self.reference = Some(reference.clone());
        }
        if let Some(verified) = update.provider_verified {
            self.provider_verified = verified;
        }
        if let Some(authenticated) = update.provider_authenticated {
            self.provider_authenticated = authenticated;
        }
        if let Some(at) = update.last_checked_at {
            self.last_checked_at = Some(at);
        }
    }
}

/// Partial update of a [`ProviderIdentityBinding`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderBindingUpdate {
    pub reference: Option<String>,
    pub provider_verified: Option<bool>,
    pub provider_authenticated: Option<bool>,
    pub last_checked_at: Option<DateTime<Utc>>,
}
