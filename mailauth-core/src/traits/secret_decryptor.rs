//! Secret decryption abstraction

use crate::error::CoreResult;

/// Turns an encrypted credential blob into the plaintext secret.
///
/// Platform implementations:
/// - `mailauth-app`: `EnvelopeDecryptor` (AES-256-GCM, PBKDF2 derived key)
pub trait SecretDecryptor: Send + Sync {
    /// # Errors
    /// `CoreError::CredentialError` when the blob is malformed or cannot be decrypted.
    fn decrypt(&self, blob: &str) -> CoreResult<String>;
}
