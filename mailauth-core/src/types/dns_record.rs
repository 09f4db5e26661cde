use serde::{Deserialize, Serialize};

use mailauth_provider::{CreateZoneRecordRequest, DnsRecordType, RecordPurpose};

/// Whether a required record was seen by the last verification pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Pending,
}

/// One record a domain must publish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    pub id: String,
    pub domain_id: String,
    pub purpose: RecordPurpose,
    pub record_type: DnsRecordType,
    /// Host relative to the domain (`"@"`, `"_dmarc"`, `"s1._domainkey"`).
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// DKIM selector, for DKIM records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub status: RecordStatus,
}

impl DnsRecord {
    /// Fully-qualified owner name of the record.
    pub fn fqdn(&self, domain: &str) -> String {
        if self.name == "@" || self.name.is_empty() {
            domain.to_string()
        } else {
            format!("{}.{domain}", self.name)
        }
    }

    pub fn to_zone_request(&self, zone_id: &str, ttl: u32) -> CreateZoneRecordRequest {
        CreateZoneRecordRequest {
            zone_id: zone_id.to_string(),
            record_type: self.record_type,
            name: self.name.clone(),
            value: self.value.clone(),
            ttl,
            priority: self.priority,
        }
    }
}

/// DKIM selectors recorded for a domain, in record order and without duplicates.
pub fn dkim_selectors(records: &[DnsRecord]) -> Vec<String> {
    let mut selectors: Vec<String> = Vec::new();
    for selector in records
        .iter()
        .filter(|r| r.purpose == RecordPurpose::Dkim)
        .filter_map(|r| r.selector.as_ref())
    {
        if !selectors.contains(selector) {
            selectors.push(selector.clone());
        }
    }
    selectors
}
