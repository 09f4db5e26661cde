//! Brevo API types
//!
//! Brevo has changed the DKIM part of its domain payload over time: older accounts get a
//! single `dkim_record` TXT, newer ones two delegated CNAMEs `dkim1Record` / `dkim2Record`.
//! Both shapes deserialize here and are flattened by [`BrevoDnsRecords::normalize`].

use serde::Deserialize;

use crate::providers::common::{full_name_to_relative, parse_record_type};
use crate::types::{DnsRecordType, RecordPurpose, RequiredDnsRecord};

/// Error body of a non-2xx answer
#[derive(Debug, Deserialize)]
pub struct BrevoApiError {
    pub code: String,
    pub message: String,
}

/// One DNS record entry inside `dns_records`
#[derive(Debug, Clone, Deserialize)]
pub struct BrevoDnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct BrevoDnsRecords {
    /// Legacy single DKIM TXT record
    pub dkim_record: Option<BrevoDnsRecord>,
    #[serde(rename = "dkim1Record")]
    pub dkim1_record: Option<BrevoDnsRecord>,
    #[serde(rename = "dkim2Record")]
    pub dkim2_record: Option<BrevoDnsRecord>,
    /// Ownership code TXT (`brevo-code:...`)
    pub brevo_code: Option<BrevoDnsRecord>,
    pub dmarc_record: Option<BrevoDnsRecord>,
    pub spf_record: Option<BrevoDnsRecord>,
}

impl BrevoDnsRecords {
    /// Flatten into provider-neutral required records.
    ///
    /// New-style DKIM CNAMEs win over the legacy TXT when both are present.
    pub fn normalize(self, domain: &str) -> Vec<RequiredDnsRecord> {
        let dkim: Vec<BrevoDnsRecord> = match (self.dkim1_record, self.dkim2_record) {
            (None, None) => self.dkim_record.into_iter().collect(),
            (a, b) => a.into_iter().chain(b).collect(),
        };

        let entries = self
            .spf_record
            .map(|r| (RecordPurpose::Spf, r))
            .into_iter()
            .chain(dkim.into_iter().map(|r| (RecordPurpose::Dkim, r)))
            .chain(self.brevo_code.map(|r| (RecordPurpose::Verification, r)))
            .chain(self.dmarc_record.map(|r| (RecordPurpose::Dmarc, r)));

        entries
            .filter_map(|(purpose, r)| {
                let record_type = match parse_record_type(&r.record_type, "brevo") {
                    Ok(t) => t,
                    Err(e) => {
                        log::warn!("[brevo] Ignoring {} record: {e}", purpose.as_str());
                        return None;
                    }
                };
                let host = if r.host_name.trim().is_empty() {
                    "@".to_string()
                } else {
                    full_name_to_relative(&r.host_name, domain)
                };
                Some(RequiredDnsRecord {
                    purpose,
                    record_type,
                    host,
                    value: unquote(&r.value, record_type),
                    priority: None,
                    provider_verified: r.status,
                })
            })
            .collect()
    }
}

/// Brevo sometimes wraps TXT values in quotes
fn unquote(value: &str, record_type: DnsRecordType) -> String {
    let trimmed = value.trim();
    if record_type == DnsRecordType::Txt {
        trimmed.trim_matches('"').to_string()
    } else {
        trimmed.to_string()
    }
}

/// `POST /senders/domains`
#[derive(Debug, Deserialize)]
pub struct BrevoCreateDomainResponse {
    pub id: Option<u64>,
    pub domain_name: String,
    #[serde(default)]
    pub dns_records: BrevoDnsRecords,
}

/// `GET /senders/domains/{domainName}`
#[derive(Debug, Deserialize)]
pub struct BrevoDomainResponse {
    pub domain: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub dns_records: BrevoDnsRecords,
}

/// `PUT /senders/domains/{domainName}/authenticate`
#[derive(Debug, Deserialize)]
pub struct BrevoAuthenticateResponse {
    #[serde(default)]
    pub domain_name: String,
    #[serde(default)]
    pub message: String,
}

/// `POST /senders`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrevoCreateSenderResponse {
    pub id: u64,
    #[serde(default)]
    pub spf_error: bool,
    #[serde(default)]
    pub dkim_error: bool,
}
