//! Credential envelopes: AES-256-GCM with a PBKDF2-HMAC-SHA256 derived key
//!
//! Envelope format: `v{version}:{salt_b64}:{nonce_b64}:{ciphertext_b64}`. The version
//! implies the PBKDF2 iteration count:
//! - v1: 100,000 iterations
//! - v2: 600,000 iterations (OWASP 2023)

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mailauth_core::error::{CoreError, CoreResult};
use mailauth_core::traits::SecretDecryptor;
use pbkdf2::pbkdf2_hmac_array;
use rand::RngCore;
use sha2::Sha256;

/// Version written by [`EnvelopeDecryptor::seal`].
pub const CURRENT_ENVELOPE_VERSION: u32 = 2;

const SALT_LENGTH: usize = 16;
const NONCE_LENGTH: usize = 12;
const KEY_LENGTH: usize = 32;

/// PBKDF2 iterations for an envelope version, `None` if unsupported.
pub const fn pbkdf2_iterations(version: u32) -> Option<u32> {
    match version {
        1 => Some(100_000),
        2 => Some(600_000),
        _ => None,
    }
}

fn derive_key(master_key: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LENGTH] {
    pbkdf2_hmac_array::<Sha256, KEY_LENGTH>(master_key.as_bytes(), salt, iterations)
}

fn credential_error(detail: impl std::fmt::Display) -> CoreError {
    CoreError::CredentialError(detail.to_string())
}

/// Decrypts credential envelopes with a master key.
pub struct EnvelopeDecryptor {
    master_key: String,
}

impl EnvelopeDecryptor {
    pub fn new(master_key: impl Into<String>) -> CoreResult<Self> {
        let master_key = master_key.into();
        if master_key.is_empty() {
            return Err(credential_error("master key is empty"));
        }
        Ok(Self { master_key })
    }

    /// Read the master key from an environment variable.
    pub fn from_env(var: &str) -> CoreResult<Self> {
        let key = std::env::var(var)
            .map_err(|_| credential_error(format!("environment variable {var} is not set")))?;
        Self::new(key)
    }

    /// Encrypt `plaintext` into a current-version envelope.
    pub fn seal(&self, plaintext: &str) -> CoreResult<String> {
        self.seal_with_version(plaintext, CURRENT_ENVELOPE_VERSION)
    }

    /// Encrypt with an explicit envelope version.
    pub fn seal_with_version(&self, plaintext: &str, version: u32) -> CoreResult<String> {
        let iterations = pbkdf2_iterations(version)
            .ok_or_else(|| credential_error(format!("unsupported envelope version {version}")))?;

        let mut salt = [0u8; SALT_LENGTH];
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        rand::rng().fill_bytes(&mut salt);
        rand::rng().fill_bytes(&mut nonce_bytes);

        let key = derive_key(&self.master_key, &salt, iterations);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| credential_error(format!("failed to create cipher: {e}")))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| credential_error(format!("encryption failed: {e}")))?;

        Ok(format!(
            "v{version}:{}:{}:{}",
            BASE64.encode(salt),
            BASE64.encode(nonce_bytes),
            BASE64.encode(ciphertext)
        ))
    }
}

impl SecretDecryptor for EnvelopeDecryptor {
    fn decrypt(&self, blob: &str) -> CoreResult<String> {
        let mut parts = blob.trim().splitn(4, ':');
        let (Some(version), Some(salt), Some(nonce), Some(ciphertext)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(credential_error("malformed envelope"));
        };

        let iterations = version
            .strip_prefix('v')
            .and_then(|v| v.parse::<u32>().ok())
            .and_then(pbkdf2_iterations)
            .ok_or_else(|| credential_error(format!("unsupported envelope version {version}")))?;

        let salt = BASE64
            .decode(salt)
            .map_err(|e| credential_error(format!("invalid salt: {e}")))?;
        let nonce_bytes = BASE64
            .decode(nonce)
            .map_err(|e| credential_error(format!("invalid nonce: {e}")))?;
        if nonce_bytes.len() != NONCE_LENGTH {
            return Err(credential_error("invalid nonce length"));
        }
        let ciphertext = BASE64
            .decode(ciphertext)
            .map_err(|e| credential_error(format!("invalid ciphertext: {e}")))?;

        let key = derive_key(&self.master_key, &salt, iterations);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| credential_error(format!("failed to create cipher: {e}")))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| credential_error("decryption failed: wrong master key or corrupted data"))?;

        String::from_utf8(plaintext).map_err(|_| credential_error("secret is not valid UTF-8"))
    }
}
