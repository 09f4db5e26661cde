use serde::{Deserialize, Serialize};

// ============ Record Types ============

/// DNS record types used by domain authentication.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// SPF, DKIM key, DMARC and ownership-verification records.
    Txt,
    /// Delegated DKIM selectors.
    Cname,
    /// Optional inbound mail exchanger.
    Mx,
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Txt => "TXT",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
        })
    }
}

// ============ Managed DNS (zones) ============

/// Status of a zone within the managed DNS provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    /// Nameservers are delegated and the zone is serving.
    Active,
    /// Waiting for the customer to point their registrar at the assigned nameservers.
    Pending,
    /// The zone was moved to another account or nameserver set.
    Moved,
    /// Status could not be determined.
    Unknown,
}

impl ZoneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Moved => "moved",
            Self::Unknown => "unknown",
        }
    }
}

/// A DNS zone hosted by the managed DNS provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Provider-specific zone identifier.
    pub id: String,
    /// Zone apex (e.g., `"example.com"`).
    pub name: String,
    /// Nameservers the customer must delegate to.
    pub name_servers: Vec<String>,
    pub status: ZoneStatus,
}

/// A record inside a managed zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    pub id: String,
    pub zone_id: String,
    pub record_type: DnsRecordType,
    /// Name relative to the zone apex (`"@"` for the apex itself).
    pub name: String,
    pub value: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

/// Request to create one record in a managed zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneRecordRequest {
    pub zone_id: String,
    pub record_type: DnsRecordType,
    /// Relative name (`"@"`, `"_dmarc"`, `"s1._domainkey"`).
    pub name: String,
    pub value: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

/// Result of `create_record`.
///
/// An existing identical record is reported as `Skipped` so that provisioning can be re-run
/// after a partial failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRecordOutcome {
    Created(ZoneRecord),
    Skipped {
        /// Relative name of the record that already existed.
        name: String,
    },
}

/// One failed record in a batch create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateFailure {
    pub request_index: usize,
    pub record_name: String,
    pub reason: String,
}

/// Aggregate result of `batch_create_records`.
#[derive(Debug, Clone, Default)]
pub struct BatchCreateResult {
    pub created: Vec<ZoneRecord>,
    pub skipped: Vec<String>,
    pub failures: Vec<BatchCreateFailure>,
}

impl BatchCreateResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============ Sending provider ============

/// What a required DNS record proves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecordPurpose {
    Spf,
    Dkim,
    /// Provider ownership code (e.g. `brevo-code:...`).
    Verification,
    Dmarc,
    Mx,
}

impl RecordPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spf => "spf",
            Self::Dkim => "dkim",
            Self::Verification => "verification",
            Self::Dmarc => "dmarc",
            Self::Mx => "mx",
        }
    }
}

/// A DNS record the sending provider asks the customer to publish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequiredDnsRecord {
    pub purpose: RecordPurpose,
    pub record_type: DnsRecordType,
    /// Host relative to the domain (`"@"` for the apex).
    pub host: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Whether the provider already sees this record.
    #[serde(default)]
    pub provider_verified: bool,
}

/// Per-mechanism verification state as reported by the sending provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MechanismStatus {
    pub spf: bool,
    pub dkim: bool,
    pub dmarc: bool,
    /// Ownership code record.
    pub ownership: bool,
}

/// A domain registered with the sending provider, normalised across API versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendingDomainIdentity {
    /// Provider reference for the domain (id or name, depending on the provider).
    pub reference: String,
    pub domain_name: String,
    /// Records the provider requires, in provider order.
    pub dns_records: Vec<RequiredDnsRecord>,
    pub authenticated: bool,
    pub verified: bool,
}

impl SendingDomainIdentity {
    /// Selectors of the DKIM records the provider expects (`"brevo1"` for `brevo1._domainkey`).
    pub fn dkim_selectors(&self) -> Vec<String> {
        self.dns_records
            .iter()
            .filter(|r| r.purpose == RecordPurpose::Dkim)
            .filter_map(|r| dkim_selector_from_host(&r.host))
            .collect()
    }

    pub fn mechanism_status(&self) -> MechanismStatus {
        let verified = |purpose: RecordPurpose| {
            let records: Vec<_> = self
                .dns_records
                .iter()
                .filter(|r| r.purpose == purpose)
                .collect();
            !records.is_empty() && records.iter().all(|r| r.provider_verified)
        };
        MechanismStatus {
            spf: verified(RecordPurpose::Spf),
            dkim: verified(RecordPurpose::Dkim),
            dmarc: verified(RecordPurpose::Dmarc),
            ownership: verified(RecordPurpose::Verification),
        }
    }
}

/// Provider-reported authentication status for a domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendingDomainStatus {
    pub domain_name: String,
    /// Provider considers DKIM/SPF authentication complete.
    pub authenticated: bool,
    /// Provider confirmed domain ownership.
    pub verified: bool,
    pub mechanisms: MechanismStatus,
}

impl From<SendingDomainIdentity> for SendingDomainStatus {
    fn from(identity: SendingDomainIdentity) -> Self {
        let mechanisms = identity.mechanism_status();
        Self {
            domain_name: identity.domain_name,
            authenticated: identity.authenticated,
            verified: identity.verified,
            mechanisms,
        }
    }
}

/// A sender address registered with the sending provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SenderRegistration {
    pub reference: String,
    pub email: String,
    /// `false` when the provider registered the sender but flagged SPF/DKIM problems.
    pub authenticated: bool,
}

/// Extract the selector from a `{selector}._domainkey[.domain]` host.
pub fn dkim_selector_from_host(host: &str) -> Option<String> {
    let lower = host.trim_end_matches('.').to_ascii_lowercase();
    let (selector, _) = lower.split_once("._domainkey")?;
    if selector.is_empty() {
        None
    } else {
        Some(selector.to_string())
    }
}

// ============ Credentials ============

/// Credentials for every supported provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// Cloudflare managed DNS. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    #[serde(rename = "cloudflare")]
    Cloudflare {
        /// Account that owns newly created zones.
        account_id: String,
        api_token: String,
    },
    /// Brevo transactional email. Requires feature `brevo`.
    #[cfg(feature = "brevo")]
    #[serde(rename = "brevo")]
    Brevo { api_key: String },
}

impl ProviderCredentials {
    pub fn provider_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare { .. } => "cloudflare",
            #[cfg(feature = "brevo")]
            Self::Brevo { .. } => "brevo",
        }
    }
}
