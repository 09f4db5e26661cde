//! Log sanitization utilities
//!
//! DKIM public keys, provider payloads and API keys must never be dumped whole into logs.

/// Maximum number of bytes of a payload included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Visible prefix of a masked secret.
const SECRET_PREFIX: usize = 4;

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Truncate a payload for safe logging.
///
/// Strings within the limit are returned unchanged; longer ones keep the first
/// `TRUNCATE_LIMIT` bytes plus a suffix with the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a credential, keeping only a short prefix for correlation.
pub fn mask_secret(secret: &str) -> String {
    if secret.len() <= SECRET_PREFIX * 2 {
        "****".to_string()
    } else {
        format!(
            "{}**** ({} chars)",
            &secret[..floor_char_boundary(secret, SECRET_PREFIX)],
            secret.chars().count()
        )
    }
}
