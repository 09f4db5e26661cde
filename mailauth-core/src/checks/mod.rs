//! SPF, DKIM and DMARC protocol checkers
//!
//! Each checker issues its DNS lookups through a [`DnsResolver`](crate::dns::DnsResolver)
//! and never fails: a missing record is a negative result with a reason, and lookup
//! failures are reported the same way.

mod dkim;
mod dmarc;
mod spf;

pub use dkim::{check_dkim, check_dkim_selectors, evaluate_dkim_cname, evaluate_dkim_txt};
pub use dmarc::{check_dmarc, evaluate_dmarc, parse_dmarc_tags};
pub use spf::{check_spf, evaluate_spf};

use crate::dns::LookupError;

/// Reason text for a lookup that failed with something other than "not found".
fn lookup_failure_reason(name: &str, err: &LookupError) -> String {
    match err {
        LookupError::Timeout => format!("DNS lookup for {name} timed out"),
        other => format!("DNS lookup for {name} failed: {other}"),
    }
}

/// `s` without `prefix`, compared ASCII case-insensitively.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// `true` when `record` is the version tag `tag` followed by a separator or nothing.
fn starts_with_version(record: &str, tag: &str) -> bool {
    strip_prefix_ci(record.trim_start(), tag).is_some_and(|rest| {
        rest.chars()
            .next()
            .is_none_or(|c| c == ' ' || c == ';' || c == '\t')
    })
}
