//! Business logic service layer

mod provisioning_service;
mod reconciliation_job;
mod reputation_service;
mod sender_service;
mod verification_service;

pub use provisioning_service::{required_records, DkimSource, ProvisioningService};
pub use reconciliation_job::{
    DomainFailure, JobGuard, JobLock, ReconcileOutcome, ReconcileReport, ReconciliationJob,
};
pub use reputation_service::ReputationService;
pub use sender_service::SenderService;
pub use verification_service::VerificationService;

use std::future::Future;
use std::sync::Arc;

use mailauth_provider::{DnsZoneProvider, ProviderError, SendingProvider};

use crate::config::PlatformConfig;
use crate::dns::DnsResolver;
use crate::error::{CoreError, CoreResult};
use crate::traits::{DomainRepository, SenderRepository};

/// Service context - holds every dependency
///
/// The platform layer builds this context and injects its storage and provider
/// implementations.
pub struct ServiceContext {
    /// Domain, record and binding persistence
    pub domain_repository: Arc<dyn DomainRepository>,
    /// Sender identity persistence
    pub sender_repository: Arc<dyn SenderRepository>,
    /// DNS lookups for the protocol checkers
    pub resolver: Arc<dyn DnsResolver>,
    /// Transactional email provider
    pub sending_provider: Arc<dyn SendingProvider>,
    /// Managed DNS provider, required for managed-mode domains only
    pub zone_provider: Option<Arc<dyn DnsZoneProvider>>,
    pub platform: PlatformConfig,
}

impl ServiceContext {
    /// Create the service context
    #[must_use]
    pub fn new(
        domain_repository: Arc<dyn DomainRepository>,
        sender_repository: Arc<dyn SenderRepository>,
        resolver: Arc<dyn DnsResolver>,
        sending_provider: Arc<dyn SendingProvider>,
        platform: PlatformConfig,
    ) -> Self {
        Self {
            domain_repository,
            sender_repository,
            resolver,
            sending_provider,
            zone_provider: None,
            platform,
        }
    }

    /// Enable managed-DNS mode
    #[must_use]
    pub fn with_zone_provider(mut self, zone_provider: Arc<dyn DnsZoneProvider>) -> Self {
        self.zone_provider = Some(zone_provider);
        self
    }

    /// The managed DNS provider
    pub fn zone_provider(&self) -> CoreResult<&Arc<dyn DnsZoneProvider>> {
        self.zone_provider
            .as_ref()
            .ok_or(CoreError::MissingZoneProvider)
    }

    /// Run a provider call under the platform's provider timeout
    pub async fn provider_call<T, F>(&self, operation: &str, fut: F) -> CoreResult<T>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let timeout = self.platform.provider_timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => Err(CoreError::Timeout {
                operation: operation.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }
}

/// Log an error at the level its classification calls for
pub(crate) fn log_core_error(context: &str, err: &CoreError) {
    if err.is_expected() {
        log::warn!("{context}: {err}");
    } else {
        log::error!("{context}: {err}");
    }
}
