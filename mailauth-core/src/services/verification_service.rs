//! Domain verification orchestrator

use std::sync::Arc;

use chrono::Utc;

use crate::checks::{check_dkim_selectors, check_dmarc, check_spf};
use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{
    dkim_selectors, DkimResult, Domain, DomainName, DomainStatus, DomainVerificationUpdate,
    DmarcResult, ProviderBindingUpdate, ProviderCheck, RecordStatus, SpfResult, VerificationPass,
    VerificationStatus,
};

/// Runs the protocol checkers and folds the outcome into domain state.
pub struct VerificationService {
    ctx: Arc<ServiceContext>,
}

impl VerificationService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// One verification pass: SPF, DKIM, DMARC and the provider's own status, concurrently.
    ///
    /// An empty `dkim_selectors` checks the platform default selector.
    pub async fn verify(
        &self,
        domain_name: &str,
        dkim_selectors: &[String],
    ) -> CoreResult<VerificationPass> {
        let name = DomainName::parse(domain_name)?;

        let provider = async {
            match self
                .ctx
                .provider_call(
                    "get_domain_status",
                    self.ctx.sending_provider.get_domain_status(name.as_str()),
                )
                .await
            {
                Ok(status) => ProviderCheck::from(status),
                Err(e) => {
                    log::warn!("Provider status for {name} unavailable: {e}");
                    ProviderCheck::unavailable(e.to_string())
                }
            }
        };

        let ((spf, dkim, dmarc), provider) =
            tokio::join!(self.check_dns(&name, dkim_selectors), provider);

        Ok(VerificationPass::new(name.as_str(), spf, dkim, dmarc, provider))
    }

    /// Verify a stored domain and write the result back.
    ///
    /// `None` selectors use the DKIM selectors recorded at provisioning time. Nothing is
    /// written when the pass does not change the stored state.
    pub async fn verify_and_persist(
        &self,
        domain_id: &str,
        domain_name: &str,
        dkim_selectors: Option<&[String]>,
    ) -> CoreResult<VerificationPass> {
        let domain = self
            .ctx
            .domain_repository
            .get_domain(domain_id)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(domain_id.to_string()))?;

        let name = DomainName::parse(domain_name)?;
        if name != domain.name {
            return Err(CoreError::ValidationError(format!(
                "Domain {domain_id} is {}, not {name}",
                domain.name
            )));
        }

        let selectors = match dkim_selectors {
            Some(selectors) if !selectors.is_empty() => selectors.to_vec(),
            _ => self.recorded_selectors(domain_id).await?,
        };

        let pass = self.verify(name.as_str(), &selectors).await?;
        self.persist(&domain, &pass).await?;
        Ok(pass)
    }

    /// Verification pass with a provider status the caller already fetched.
    pub(crate) async fn verify_with_provider(
        &self,
        name: &DomainName,
        dkim_selectors: &[String],
        provider: ProviderCheck,
    ) -> VerificationPass {
        let (spf, dkim, dmarc) = self.check_dns(name, dkim_selectors).await;
        VerificationPass::new(name.as_str(), spf, dkim, dmarc, provider)
    }

    /// DKIM selectors stored with the domain's records.
    pub(crate) async fn recorded_selectors(&self, domain_id: &str) -> CoreResult<Vec<String>> {
        let records = self
            .ctx
            .domain_repository
            .list_dns_records(domain_id)
            .await?;
        Ok(dkim_selectors(&records))
    }

    async fn check_dns(
        &self,
        name: &DomainName,
        dkim_selectors: &[String],
    ) -> (SpfResult, DkimResult, DmarcResult) {
        let platform = &self.ctx.platform;
        let resolver = self.ctx.resolver.as_ref();
        let default_selector = [platform.default_dkim_selector.clone()];
        let selectors = if dkim_selectors.is_empty() {
            &default_selector[..]
        } else {
            dkim_selectors
        };

        tokio::join!(
            check_spf(resolver, name.as_str(), &platform.spf_include),
            check_dkim_selectors(
                resolver,
                name.as_str(),
                selectors,
                &platform.dkim_cname_marker
            ),
            check_dmarc(resolver, name.as_str()),
        )
    }

    /// Write the pass result if it changes anything. Returns whether a write happened.
    pub(crate) async fn persist(&self, domain: &Domain, pass: &VerificationPass) -> CoreResult<bool> {
        let repo = &self.ctx.domain_repository;
        let mut written = false;

        let update = next_verification_state(domain, pass);
        if update.changes(domain) {
            repo.update_domain_verification(&domain.id, &update).await?;
            written = true;

            if pass.overall_valid != domain.is_verified() {
                let status = if pass.overall_valid {
                    RecordStatus::Active
                } else {
                    RecordStatus::Pending
                };
                repo.set_dns_records_status(&domain.id, status).await?;
            }

            log::info!(
                "Domain {} verification: spf={} dkim={} dmarc={} -> {:?}",
                domain.name,
                pass.spf.valid,
                pass.dkim.valid,
                pass.dmarc.valid,
                update.verification_status
            );
        }

        if pass.provider.is_available() {
            let binding = repo.get_or_create_provider_binding(&domain.id).await?;
            if binding.provider_verified != pass.provider.verified
                || binding.provider_authenticated != pass.provider.authenticated
                || binding.last_checked_at.is_none()
            {
                repo.update_provider_binding(
                    &domain.id,
                    &ProviderBindingUpdate {
                        provider_verified: Some(pass.provider.verified),
                        provider_authenticated: Some(pass.provider.authenticated),
                        last_checked_at: Some(pass.checked_at),
                        ..Default::default()
                    },
                )
                .await?;
                written = true;
            }
        }

        Ok(written)
    }
}

/// Domain fields after `pass`.
///
/// `verified` requires SPF and DKIM; losing either demotes a verified domain to `pending`.
/// Failed or expired domains keep their lifecycle status unless the pass succeeds.
fn next_verification_state(domain: &Domain, pass: &VerificationPass) -> DomainVerificationUpdate {
    let verification_status = if pass.overall_valid {
        VerificationStatus::Verified
    } else if domain.verification_status == VerificationStatus::Verified {
        VerificationStatus::Pending
    } else {
        domain.verification_status
    };

    let status = if pass.overall_valid {
        DomainStatus::Active
    } else if domain.status.is_terminal() {
        domain.status
    } else {
        DomainStatus::Pending
    };

    DomainVerificationUpdate {
        spf_verified: pass.spf.valid,
        dkim_verified: pass.dkim.valid,
        dmarc_verified: pass.dmarc.valid,
        verification_status,
        status,
        last_checked_at: Utc::now(),
    }
}
