//! Sender registration and send authorization

use std::sync::Arc;

use mailauth_provider::ProviderError;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{SendAuthorization, SenderIdentity};

/// Sender service
pub struct SenderService {
    ctx: Arc<ServiceContext>,
}

impl SenderService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Register `email` as a sender of the domain.
    ///
    /// Registering an address twice returns the stored identity.
    pub async fn register_sender(
        &self,
        domain_id: &str,
        email: &str,
        display_name: Option<&str>,
    ) -> CoreResult<SenderIdentity> {
        let domain = self
            .ctx
            .domain_repository
            .get_domain(domain_id)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(domain_id.to_string()))?;

        let email = normalize_address(email)?;
        let address_domain = email.rsplit('@').next().unwrap_or_default();
        if address_domain != domain.name.as_str() {
            return Err(CoreError::InvalidSenderAddress {
                email,
                reason: format!("address is not on {}", domain.name),
            });
        }

        let repo = &self.ctx.sender_repository;
        if let Some(existing) = repo.find_sender_by_email(&email).await? {
            return Ok(existing);
        }

        let local_part = email.split('@').next().unwrap_or_default();
        let display_name = display_name.unwrap_or(local_part);
        let provider = &self.ctx.sending_provider;
        let mut sender = SenderIdentity::new(domain.id.as_str(), email.as_str());

        match self
            .ctx
            .provider_call(
                "register_sender",
                provider.register_sender(&email, display_name),
            )
            .await
        {
            Ok(registration) => {
                sender.external_reference = Some(registration.reference);
                sender.verified = registration.authenticated;
            }
            Err(CoreError::Provider(ProviderError::SenderExists { .. })) => {
                log::info!("Sender {email} already exists at {}", provider.id());
            }
            Err(e) => return Err(e),
        }

        repo.create_sender(&sender).await?;
        log::info!("Registered sender {email} for {}", domain.name);
        Ok(sender)
    }

    /// Whether `email` may send right now.
    pub async fn authorize(&self, email: &str) -> CoreResult<SendAuthorization> {
        let email = email.trim().to_ascii_lowercase();
        let Some(sender) = self
            .ctx
            .sender_repository
            .find_sender_by_email(&email)
            .await?
        else {
            return Ok(SendAuthorization::UnknownSender);
        };

        if sender.disabled {
            return Ok(SendAuthorization::SenderDisabled {
                reason: sender.disabled_reason.unwrap_or_default(),
            });
        }

        match self
            .ctx
            .domain_repository
            .get_domain(&sender.domain_id)
            .await?
        {
            Some(domain) if domain.is_verified() => Ok(SendAuthorization::Authorized),
            Some(domain) => Ok(SendAuthorization::DomainNotVerified {
                domain: domain.name.to_string(),
            }),
            None => Ok(SendAuthorization::DomainNotVerified {
                domain: email.rsplit('@').next().unwrap_or_default().to_string(),
            }),
        }
    }
}

/// Lowercase `local@domain` with exactly one `@` and a non-empty local part.
fn normalize_address(email: &str) -> CoreResult<String> {
    let email = email.trim().to_ascii_lowercase();
    let invalid = |reason: &str| CoreError::InvalidSenderAddress {
        email: email.clone(),
        reason: reason.to_string(),
    };

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid("missing '@'"));
    };
    if local.is_empty() {
        return Err(invalid("empty local part"));
    }
    if domain.contains('@') {
        return Err(invalid("more than one '@'"));
    }
    if local.chars().any(char::is_whitespace) {
        return Err(invalid("local part contains whitespace"));
    }
    Ok(email)
}
