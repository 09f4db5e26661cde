use serde::{Deserialize, Serialize};

use mailauth_provider::BatchCreateFailure;

use super::{DnsOwnership, DnsRecord, Domain, ManagedZoneBinding};

/// Request to add a sending domain to an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub account_id: String,
    pub domain_name: String,
    pub ownership: DnsOwnership,
    /// Generate a platform DKIM key instead of using the sending provider's records.
    /// Manual mode only.
    #[serde(default)]
    pub self_managed_dkim: bool,
    /// Selector for a self-managed key. Defaults to the platform selector.
    #[serde(default)]
    pub dkim_selector: Option<String>,
}

/// What the caller shows the customer after provisioning.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ProvisionOutcome {
    /// Customer must delegate to these nameservers; the platform publishes the records.
    #[serde(rename_all = "camelCase")]
    Managed {
        domain: Domain,
        zone: ManagedZoneBinding,
        records: Vec<DnsRecord>,
        /// Records the zone provider rejected; retried by reconciliation.
        publish_failures: Vec<BatchCreateFailure>,
    },
    /// Customer must publish these records at their DNS host.
    #[serde(rename_all = "camelCase")]
    Manual {
        domain: Domain,
        records: Vec<DnsRecord>,
        /// PEM private key of a self-managed DKIM key, handed to the signing collaborator.
        #[serde(skip_serializing_if = "Option::is_none")]
        dkim_private_key_pem: Option<String>,
    },
}

impl ProvisionOutcome {
    pub fn domain(&self) -> &Domain {
        match self {
            Self::Managed { domain, .. } | Self::Manual { domain, .. } => domain,
        }
    }

    pub fn records(&self) -> &[DnsRecord] {
        match self {
            Self::Managed { records, .. } | Self::Manual { records, .. } => records,
        }
    }

    /// Nameservers to delegate to, managed mode only.
    pub fn name_servers(&self) -> Option<&[String]> {
        match self {
            Self::Managed { zone, .. } => Some(&zone.name_servers),
            Self::Manual { .. } => None,
        }
    }
}
