//! Brevo `SendingProvider` implementation

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::error::Result;
use crate::traits::{ErrorContext, SendingProvider};
use crate::types::{SenderRegistration, SendingDomainIdentity};

use super::{
    BrevoAuthenticateResponse, BrevoCreateDomainResponse, BrevoCreateSenderResponse,
    BrevoDomainResponse, BrevoProvider,
};

fn domain_path(name: &str) -> String {
    format!("/senders/domains/{}", urlencoding::encode(name))
}

#[async_trait]
impl SendingProvider for BrevoProvider {
    fn id(&self) -> &'static str {
        "brevo"
    }

    async fn register_domain(&self, name: &str) -> Result<SendingDomainIdentity> {
        let body = json!({ "name": name });
        let resp: BrevoCreateDomainResponse = self
            .request(
                Method::POST,
                "/senders/domains",
                Some(&body),
                ErrorContext::domain(name),
            )
            .await?;

        log::info!("[brevo] Registered sending domain {}", resp.domain_name);
        let reference = resp
            .id
            .map_or_else(|| resp.domain_name.clone(), |id| id.to_string());
        let dns_records = resp.dns_records.normalize(&resp.domain_name);
        Ok(SendingDomainIdentity {
            reference,
            domain_name: resp.domain_name,
            dns_records,
            authenticated: false,
            verified: false,
        })
    }

    async fn get_domain_identity(&self, name: &str) -> Result<SendingDomainIdentity> {
        let resp: BrevoDomainResponse = self
            .request(Method::GET, &domain_path(name), None, ErrorContext::domain(name))
            .await?;

        let dns_records = resp.dns_records.normalize(&resp.domain);
        Ok(SendingDomainIdentity {
            reference: resp.domain.clone(),
            domain_name: resp.domain,
            dns_records,
            authenticated: resp.authenticated,
            verified: resp.verified,
        })
    }

    async fn trigger_recheck(&self, name: &str) -> Result<()> {
        let resp: Option<BrevoAuthenticateResponse> = self
            .request(
                Method::PUT,
                &format!("{}/authenticate", domain_path(name)),
                None,
                ErrorContext::domain(name),
            )
            .await?;

        if let Some(resp) = resp {
            log::debug!(
                "[brevo] Re-check requested for {}: {}",
                resp.domain_name,
                resp.message
            );
        }
        Ok(())
    }

    async fn register_sender(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<SenderRegistration> {
        let body = json!({ "name": display_name, "email": email });
        let ctx = ErrorContext {
            email: Some(email.to_string()),
            ..ErrorContext::default()
        };
        let resp: BrevoCreateSenderResponse = self
            .request(Method::POST, "/senders", Some(&body), ctx)
            .await?;

        if resp.spf_error || resp.dkim_error {
            log::warn!(
                "[brevo] Sender {email} registered with authentication issues (spf_error={}, dkim_error={})",
                resp.spf_error,
                resp.dkim_error
            );
        }

        Ok(SenderRegistration {
            reference: resp.id.to_string(),
            email: email.to_string(),
            authenticated: !(resp.spf_error || resp.dkim_error),
        })
    }
}
