//! Brevo error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::BrevoProvider;

const UNKNOWN: &str = "<unknown>";

/// Brevo error codes
/// Reference: <https://developers.brevo.com/docs/how-it-works#error-codes>
impl ProviderErrorMapper for BrevoProvider {
    fn provider_name(&self) -> &'static str {
        "brevo"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        let duplicate = raw.code.as_deref() == Some("duplicate_parameter")
            || raw.message.to_ascii_lowercase().contains("already exist");

        if duplicate {
            return if let Some(email) = context.email {
                ProviderError::SenderExists {
                    provider,
                    email,
                    raw_message: Some(raw.message),
                }
            } else {
                ProviderError::DomainExists {
                    provider,
                    domain: context.domain.unwrap_or_else(|| UNKNOWN.to_string()),
                    raw_message: Some(raw.message),
                }
            };
        }

        match (raw.code.as_deref(), raw.status) {
            (Some("unauthorized"), _) | (_, Some(401)) => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },
            (Some("permission_denied" | "account_under_validation"), _) | (_, Some(403)) => {
                ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                }
            }
            (Some("document_not_found"), _) | (_, Some(404)) => ProviderError::DomainNotFound {
                provider,
                domain: context
                    .domain
                    .or(context.email)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                raw_message: Some(raw.message),
            },
            (Some("not_enough_credits"), _) => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },
            (Some(code @ ("invalid_parameter" | "missing_parameter" | "out_of_range")), _) => {
                ProviderError::InvalidParameter {
                    provider,
                    param: code.to_string(),
                    detail: raw.message,
                }
            }
            _ => self.unknown_error(raw),
        }
    }
}
