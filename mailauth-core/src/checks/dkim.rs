use futures::future::join_all;

use crate::dns::{DnsResolver, LookupError};
use crate::types::{DkimRecordType, DkimResult};

use super::lookup_failure_reason;

/// Check one selector: a delegated CNAME first, then a published TXT key.
pub async fn check_dkim(
    resolver: &dyn DnsResolver,
    domain: &str,
    selector: &str,
    cname_marker: &str,
) -> DkimResult {
    let name = format!("{selector}._domainkey.{domain}");

    match resolver.lookup_cname(&name).await {
        Ok(target) => return evaluate_dkim_cname(selector, &target, cname_marker),
        Err(LookupError::NotFound) => {}
        Err(e) => return lookup_failed(selector, &name, &e),
    }

    match resolver.lookup_txt(&name).await {
        Ok(records) => evaluate_dkim_txt(selector, &records),
        Err(LookupError::NotFound) => evaluate_dkim_txt(selector, &[]),
        Err(e) => lookup_failed(selector, &name, &e),
    }
}

/// Check every selector concurrently; any valid selector passes.
///
/// Reports the first valid selector in input order, otherwise the first selector's failure.
pub async fn check_dkim_selectors(
    resolver: &dyn DnsResolver,
    domain: &str,
    selectors: &[String],
    cname_marker: &str,
) -> DkimResult {
    let checks = selectors
        .iter()
        .map(|selector| check_dkim(resolver, domain, selector, cname_marker));
    let mut results = join_all(checks).await;

    if let Some(pos) = results.iter().position(|r| r.valid) {
        return results.swap_remove(pos);
    }
    if results.is_empty() {
        return DkimResult {
            valid: false,
            selector: String::new(),
            record: None,
            record_type: None,
            reason: "no DKIM selector to check".to_string(),
        };
    }
    results.swap_remove(0)
}

fn lookup_failed(selector: &str, name: &str, err: &LookupError) -> DkimResult {
    log::debug!("DKIM lookup for {name} failed: {err}");
    DkimResult {
        valid: false,
        selector: selector.to_string(),
        record: None,
        record_type: None,
        reason: lookup_failure_reason(name, err),
    }
}

/// Evaluate a CNAME found at the selector name.
pub fn evaluate_dkim_cname(selector: &str, target: &str, cname_marker: &str) -> DkimResult {
    let target = target.trim_end_matches('.');
    let marker = cname_marker.trim_matches('.').to_ascii_lowercase();
    let valid = target.to_ascii_lowercase().contains(&marker);
    let reason = if valid {
        "DKIM selector is delegated to the platform".to_string()
    } else {
        format!("CNAME points to {target}, expected a target under {marker}")
    };

    DkimResult {
        valid,
        selector: selector.to_string(),
        record: Some(target.to_string()),
        record_type: Some(DkimRecordType::Cname),
        reason,
    }
}

/// Evaluate TXT records found at the selector name.
pub fn evaluate_dkim_txt(selector: &str, records: &[String]) -> DkimResult {
    let result = |valid: bool, record: Option<&String>, reason: String| DkimResult {
        valid,
        selector: selector.to_string(),
        record: record.cloned(),
        record_type: record.map(|_| DkimRecordType::Txt),
        reason,
    };

    let Some(first) = records.first() else {
        return result(false, None, "no DKIM record".to_string());
    };

    let Some(record) = records.iter().find(|r| has_version_tag(r)) else {
        return result(false, Some(first), "record is missing v=DKIM1".to_string());
    };

    match tag_value(record, "p") {
        None => result(false, Some(record), "record has no p= public key".to_string()),
        Some(key) if key.is_empty() => result(
            false,
            Some(record),
            "public key is empty (p=), the key was revoked".to_string(),
        ),
        Some(key) if !key.bytes().all(is_base64_byte) => result(
            false,
            Some(record),
            "p= public key is not valid base64".to_string(),
        ),
        Some(_) => result(true, Some(record), "DKIM public key is published".to_string()),
    }
}

fn has_version_tag(record: &str) -> bool {
    tag_value(record, "v").is_some_and(|v| v.eq_ignore_ascii_case("DKIM1"))
}

/// Value of tag `name` in a `tag=value; ...` list, whitespace removed.
fn tag_value(record: &str, name: &str) -> Option<String> {
    record.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim().eq_ignore_ascii_case(name).then(|| {
            value
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect()
        })
    })
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "dkim.platform.com";

    #[test]
    fn platform_cname_is_valid() {
        let r = evaluate_dkim_cname("selector", "selector.dkim.platform.com.", MARKER);
        assert!(r.valid);
        assert_eq!(r.record_type, Some(DkimRecordType::Cname));
        assert_eq!(r.record.as_deref(), Some("selector.dkim.platform.com"));
    }

    #[test]
    fn foreign_cname_reports_actual_target() {
        let r = evaluate_dkim_cname("selector", "other-provider.com", MARKER);
        assert!(!r.valid);
        assert_eq!(r.record_type, Some(DkimRecordType::Cname));
        assert_eq!(r.record.as_deref(), Some("other-provider.com"));
        assert!(r.reason.contains("other-provider.com"));
    }

    #[test]
    fn txt_key_is_valid() {
        let r = evaluate_dkim_txt("s1", &["v=DKIM1; k=rsa; p=ABC123".to_string()]);
        assert!(r.valid);
        assert_eq!(r.record_type, Some(DkimRecordType::Txt));
    }

    #[test]
    fn txt_key_with_folded_whitespace_is_valid() {
        let r = evaluate_dkim_txt("s1", &["v=DKIM1; k=rsa; p=MIGf MA0G CSqG".to_string()]);
        assert!(r.valid);
    }

    #[test]
    fn malformed_txt_reasons() {
        let r = evaluate_dkim_txt("s1", &["k=rsa; p=ABC123".to_string()]);
        assert!(!r.valid);
        assert!(r.reason.contains("v=DKIM1"));

        let r = evaluate_dkim_txt("s1", &["v=DKIM1; k=rsa".to_string()]);
        assert!(r.reason.contains("no p="));

        let r = evaluate_dkim_txt("s1", &["v=DKIM1; k=rsa; p=".to_string()]);
        assert!(r.reason.contains("revoked"));

        let r = evaluate_dkim_txt("s1", &["v=DKIM1; p=not*base64".to_string()]);
        assert!(r.reason.contains("base64"));
    }

    #[test]
    fn absent_txt_is_no_record() {
        let r = evaluate_dkim_txt("s1", &[]);
        assert!(!r.valid);
        assert_eq!(r.reason, "no DKIM record");
        assert!(r.record_type.is_none());
    }

    #[test]
    fn p_tag_is_not_confused_with_other_tags() {
        // "t=y" and "h=sha256" contain no p= key
        let r = evaluate_dkim_txt("s1", &["v=DKIM1; h=sha256; t=y".to_string()]);
        assert!(!r.valid);
    }
}
