//! RSA key pairs for self-managed DKIM.
//!
//! Only the public half is published; the PEM private key is handed to the signing
//! collaborator and never stored by this crate.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand_core::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::types::DomainName;

/// Key size required for new DKIM keys.
pub const DKIM_KEY_BITS: usize = 2048;

/// A generated DKIM key pair and the DNS values derived from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DkimKeyPair {
    pub selector: String,
    /// `{selector}._domainkey`, relative to the domain.
    pub host: String,
    /// Base64 DER `SubjectPublicKeyInfo`.
    pub public_key_b64: String,
    /// `v=DKIM1; k=rsa; p=...`
    pub txt_value: String,
    /// Where the platform would serve the key when the customer delegates by CNAME.
    pub cname_target: String,
    #[serde(skip_serializing)]
    pub private_key_pem: String,
}

/// Generate an RSA-2048 DKIM key pair for `selector` on `domain`.
///
/// CPU bound; call through `spawn_blocking` from async code.
pub fn generate_dkim_key_pair(
    domain: &DomainName,
    selector: &str,
    cname_marker: &str,
) -> CoreResult<DkimKeyPair> {
    let private_key = RsaPrivateKey::new(&mut OsRng, DKIM_KEY_BITS)
        .map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
    let public_key = RsaPublicKey::from(&private_key);

    let public_der = public_key
        .to_public_key_der()
        .map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
    let private_key_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CoreError::KeyGeneration(e.to_string()))?
        .to_string();

    let public_key_b64 = BASE64.encode(public_der.as_bytes());
    log::debug!(
        "Generated {DKIM_KEY_BITS}-bit DKIM key for {selector}._domainkey.{domain}"
    );

    Ok(DkimKeyPair {
        selector: selector.to_string(),
        host: format!("{selector}._domainkey"),
        txt_value: format!("v=DKIM1; k=rsa; p={public_key_b64}"),
        cname_target: format!(
            "{selector}.{}.{}",
            domain.as_str().replace('.', "-"),
            cname_marker.trim_matches('.')
        ),
        public_key_b64,
        private_key_pem,
    })
}
