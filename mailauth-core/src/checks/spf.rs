use crate::dns::{DnsResolver, LookupError};
use crate::types::SpfResult;

use super::{lookup_failure_reason, starts_with_version, strip_prefix_ci};

const TERMINATORS: [&str; 3] = ["~all", "-all", "?all"];

/// Check the SPF record of `domain` for the platform's `include:`.
pub async fn check_spf(resolver: &dyn DnsResolver, domain: &str, required_include: &str) -> SpfResult {
    match resolver.lookup_txt(domain).await {
        Ok(records) => evaluate_spf(&records, required_include),
        Err(LookupError::NotFound) => evaluate_spf(&[], required_include),
        Err(e) => {
            log::debug!("SPF lookup for {domain} failed: {e}");
            SpfResult {
                valid: false,
                record: None,
                reason: lookup_failure_reason(domain, &e),
                includes_platform: false,
            }
        }
    }
}

/// Evaluate the TXT records found at the domain apex.
pub fn evaluate_spf(records: &[String], required_include: &str) -> SpfResult {
    let Some(record) = records.iter().find(|r| starts_with_version(r, "v=spf1")) else {
        return SpfResult {
            valid: false,
            record: None,
            reason: "no SPF record".to_string(),
            includes_platform: false,
        };
    };

    let terms: Vec<&str> = record.split_whitespace().skip(1).collect();
    let includes_platform = terms.iter().any(|term| {
        let term = term.trim_start_matches(['+', '~', '-', '?']);
        strip_prefix_ci(term, "include:").is_some_and(|target| {
            target
                .trim_end_matches('.')
                .eq_ignore_ascii_case(required_include.trim_end_matches('.'))
        })
    });

    let (valid, reason) = if !includes_platform {
        (false, format!("missing include:{required_include}"))
    } else if !terms
        .last()
        .is_some_and(|last| TERMINATORS.iter().any(|t| last.eq_ignore_ascii_case(t)))
    {
        (false, "missing terminating mechanism".to_string())
    } else {
        (true, "SPF record authorizes the platform".to_string())
    };

    SpfResult {
        valid,
        record: Some(record.clone()),
        reason,
        includes_platform,
    }
}
