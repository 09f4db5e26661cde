//! TOML application configuration

use std::path::Path;
use std::time::Duration;

use mailauth_core::error::{CoreError, CoreResult};
use mailauth_core::traits::SecretDecryptor;
use mailauth_core::{PlatformConfig, ReconcileConfig};
use mailauth_provider::{ClientOptions, ProviderCredentials, RetryPolicy};
use serde::Deserialize;

/// Root of `mailauth.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub reconcile: ReconcileConfig,
    pub log: LogConfig,
    pub secrets: SecretsConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Environment variable holding the master key for credential envelopes.
    pub master_key_env: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            master_key_env: "MAILAUTH_MASTER_KEY".to_string(),
        }
    }
}

/// Provider credentials. Secret values are envelopes, never plaintext.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    pub cloudflare: Option<CloudflareConfig>,
    pub brevo: Option<BrevoConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareConfig {
    pub account_id: String,
    pub api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrevoConfig {
    pub api_key: String,
}

impl AppConfig {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> CoreResult<Self> {
        toml::from_str(raw).map_err(|e| CoreError::ConfigError(format!("Invalid config: {e}")))
    }

    /// Transport settings for the provider clients.
    ///
    /// `provider_timeout_secs` bounds a whole call including retries, so each attempt
    /// gets an equal share of it.
    pub fn client_options(&self) -> ClientOptions {
        let retry = RetryPolicy::default();
        let attempts = retry.max_retries + 1;
        let per_request =
            (self.platform.provider_timeout() / attempts).max(Duration::from_secs(1));
        ClientOptions {
            timeout: per_request,
            retry,
        }
    }

    /// Decrypted credentials of the sending provider, which is required.
    pub fn sending_credentials(
        &self,
        decryptor: &dyn SecretDecryptor,
    ) -> CoreResult<ProviderCredentials> {
        let brevo = self.providers.brevo.as_ref().ok_or_else(|| {
            CoreError::ConfigError("[providers.brevo] is required".to_string())
        })?;
        Ok(ProviderCredentials::Brevo {
            api_key: decryptor.decrypt(&brevo.api_key)?,
        })
    }

    /// Decrypted credentials of the managed DNS provider, when one is configured.
    pub fn zone_credentials(
        &self,
        decryptor: &dyn SecretDecryptor,
    ) -> CoreResult<Option<ProviderCredentials>> {
        self.providers
            .cloudflare
            .as_ref()
            .map(|cf| {
                Ok(ProviderCredentials::Cloudflare {
                    account_id: cf.account_id.clone(),
                    api_token: decryptor.decrypt(&cf.api_token)?,
                })
            })
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    struct Plain;

    impl SecretDecryptor for Plain {
        fn decrypt(&self, blob: &str) -> CoreResult<String> {
            blob.strip_prefix("sealed:")
                .map(ToString::to_string)
                .ok_or_else(|| CoreError::CredentialError("not sealed".to_string()))
        }
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.reconcile.interval_secs, 300);
        assert_eq!(cfg.platform.record_ttl, 3600);
        assert!(cfg.providers.cloudflare.is_none());
    }

    #[test]
    fn credentials_are_decrypted() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [providers.brevo]
            api_key = "sealed:xkeysib-1"

            [providers.cloudflare]
            account_id = "acc"
            api_token = "sealed:cf-token"
            "#,
        )
        .unwrap();

        match cfg.sending_credentials(&Plain).unwrap() {
            ProviderCredentials::Brevo { api_key } => assert_eq!(api_key, "xkeysib-1"),
            other => panic!("unexpected credentials {other:?}"),
        }
        match cfg.zone_credentials(&Plain).unwrap() {
            Some(ProviderCredentials::Cloudflare { api_token, .. }) => {
                assert_eq!(api_token, "cf-token");
            }
            other => panic!("unexpected credentials {other:?}"),
        }
    }

    #[test]
    fn missing_sending_provider_is_a_config_error() {
        let cfg = AppConfig::from_toml_str("[log]\nlevel = \"debug\"").unwrap();
        assert!(matches!(
            cfg.sending_credentials(&Plain),
            Err(CoreError::ConfigError(_))
        ));
        assert!(cfg.zone_credentials(&Plain).unwrap().is_none());
    }

    #[test]
    fn request_timeout_leaves_room_for_retries() {
        let cfg = AppConfig::from_toml_str("[platform]\nprovider_timeout_secs = 60").unwrap();
        let options = cfg.client_options();
        assert_eq!(options.retry.max_retries, 3);
        assert_eq!(options.timeout, Duration::from_secs(15));
        assert!(
            options.timeout * (options.retry.max_retries + 1) <= cfg.platform.provider_timeout()
        );

        let cfg = AppConfig::from_toml_str("[platform]\nprovider_timeout_secs = 2").unwrap();
        assert_eq!(cfg.client_options().timeout, Duration::from_secs(1));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = AppConfig::from_toml_str("[platform\nspf_include = 1").unwrap_err();
        assert!(matches!(err, CoreError::ConfigError(_)));
    }
}
