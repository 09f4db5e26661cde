use crate::dns::{DnsResolver, LookupError};
use crate::types::{Alignment, DmarcPolicy, DmarcResult, DmarcTags};

use super::{lookup_failure_reason, starts_with_version};

/// Check the DMARC record at `_dmarc.{domain}`.
pub async fn check_dmarc(resolver: &dyn DnsResolver, domain: &str) -> DmarcResult {
    let name = format!("_dmarc.{domain}");
    match resolver.lookup_txt(&name).await {
        Ok(records) => evaluate_dmarc(&records),
        Err(LookupError::NotFound) => evaluate_dmarc(&[]),
        Err(e) => {
            log::debug!("DMARC lookup for {name} failed: {e}");
            DmarcResult {
                valid: false,
                record: None,
                policy: None,
                reporting_enabled: false,
                reason: lookup_failure_reason(&name, &e),
                tags: None,
            }
        }
    }
}

/// Evaluate the TXT records found at `_dmarc.{domain}`.
pub fn evaluate_dmarc(records: &[String]) -> DmarcResult {
    let Some(record) = records.iter().find(|r| starts_with_version(r, "v=DMARC1")) else {
        return DmarcResult {
            valid: false,
            record: None,
            policy: None,
            reporting_enabled: false,
            reason: "no DMARC record (recommended, does not block verification)".to_string(),
            tags: None,
        };
    };

    let tags = parse_dmarc_tags(record);
    let reporting_enabled = !tags.rua.is_empty();
    let (valid, reason) = match tags.policy {
        None => (false, "DMARC record has no valid p= policy".to_string()),
        Some(DmarcPolicy::None) => (
            true,
            "p=none only monitors; consider quarantine or reject".to_string(),
        ),
        Some(policy) => (true, format!("DMARC policy {} is enforced", policy.as_str())),
    };

    DmarcResult {
        valid,
        record: Some(record.clone()),
        policy: tags.policy,
        reporting_enabled,
        reason,
        tags: Some(tags),
    }
}

/// Parse `;`-separated DMARC tags. Unknown or malformed tags are skipped.
pub fn parse_dmarc_tags(record: &str) -> DmarcTags {
    let mut tags = DmarcTags::default();

    for part in record.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "p" => tags.policy = DmarcPolicy::parse(value),
            "sp" => tags.subdomain_policy = DmarcPolicy::parse(value),
            "pct" => tags.pct = value.parse::<u8>().ok().filter(|pct| *pct <= 100),
            "rua" => tags.rua = uri_list(value),
            "ruf" => tags.ruf = uri_list(value),
            "adkim" => tags.adkim = alignment(value),
            "aspf" => tags.aspf = alignment(value),
            _ => {}
        }
    }

    tags
}

fn uri_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn alignment(value: &str) -> Option<Alignment> {
    match value.to_ascii_lowercase().as_str() {
        "r" => Some(Alignment::Relaxed),
        "s" => Some(Alignment::Strict),
        _ => None,
    }
}
