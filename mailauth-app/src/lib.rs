//! Platform bootstrap for the mail authentication engine.
//!
//! Provides `AppConfig` (TOML configuration), `AppState` (service container) and
//! `AppStateBuilder` (adapter injection).

pub mod adapters;
pub mod config;

use std::sync::Arc;

use mailauth_core::dns::{DnsResolver, HickoryResolver};
use mailauth_core::error::{CoreError, CoreResult};
use mailauth_core::services::{
    ProvisioningService, ReconciliationJob, ReputationService, SenderService, ServiceContext,
    VerificationService,
};
use mailauth_core::traits::{DomainRepository, SecretDecryptor, SenderRepository};
use mailauth_core::{PlatformConfig, ReconcileConfig};
use mailauth_provider::{
    create_sending_provider, create_zone_provider, DnsZoneProvider,
    SendingProvider,
};

pub use config::AppConfig;

/// Application state.
///
/// Holds the `ServiceContext` and every service built on it. Constructed once at startup
/// via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    pub verification_service: VerificationService,
    pub provisioning_service: ProvisioningService,
    pub sender_service: SenderService,
    pub reputation_service: ReputationService,
    /// Shared with the scheduler task
    pub reconciliation_job: Arc<ReconciliationJob>,
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required
/// - `domain_repository`
/// - `sender_repository`
/// - `sending_provider`
///
/// # Optional
/// - `resolver`: defaults to the system resolver
/// - `zone_provider`: without it managed-DNS provisioning is rejected
/// - `platform` / `reconcile`: default settings
pub struct AppStateBuilder {
    domain_repository: Option<Arc<dyn DomainRepository>>,
    sender_repository: Option<Arc<dyn SenderRepository>>,
    resolver: Option<Arc<dyn DnsResolver>>,
    sending_provider: Option<Arc<dyn SendingProvider>>,
    zone_provider: Option<Arc<dyn DnsZoneProvider>>,
    platform: PlatformConfig,
    reconcile: ReconcileConfig,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            domain_repository: None,
            sender_repository: None,
            resolver: None,
            sending_provider: None,
            zone_provider: None,
            platform: PlatformConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Settings and provider clients from a loaded config file.
    ///
    /// Provider secrets are decrypted with `decryptor`.
    pub fn from_config(config: &AppConfig, decryptor: &dyn SecretDecryptor) -> CoreResult<Self> {
        let options = config.client_options();

        let sending = create_sending_provider(config.sending_credentials(decryptor)?, options)?;
        let mut builder = Self::new()
            .platform(config.platform.clone())
            .reconcile(config.reconcile)
            .sending_provider(sending);

        if let Some(credentials) = config.zone_credentials(decryptor)? {
            builder = builder.zone_provider(create_zone_provider(credentials, options)?);
        } else {
            log::info!("No managed DNS provider configured, manual mode only");
        }
        Ok(builder)
    }

    #[must_use]
    pub fn domain_repository(mut self, repo: Arc<dyn DomainRepository>) -> Self {
        self.domain_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn sender_repository(mut self, repo: Arc<dyn SenderRepository>) -> Self {
        self.sender_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn DnsResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn sending_provider(mut self, provider: Arc<dyn SendingProvider>) -> Self {
        self.sending_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn zone_provider(mut self, provider: Arc<dyn DnsZoneProvider>) -> Self {
        self.zone_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: PlatformConfig) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn reconcile(mut self, reconcile: ReconcileConfig) -> Self {
        self.reconcile = reconcile;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let domain_repository = self.domain_repository.ok_or_else(|| {
            CoreError::ValidationError("domain_repository is required".to_string())
        })?;
        let sender_repository = self.sender_repository.ok_or_else(|| {
            CoreError::ValidationError("sender_repository is required".to_string())
        })?;
        let sending_provider = self.sending_provider.ok_or_else(|| {
            CoreError::ValidationError("sending_provider is required".to_string())
        })?;
        let platform = self.platform;
        let resolver = self.resolver.unwrap_or_else(|| {
            Arc::new(HickoryResolver::from_system(platform.dns_timeout()))
        });

        let mut ctx = ServiceContext::new(
            domain_repository,
            sender_repository,
            resolver,
            sending_provider,
            platform,
        );
        if let Some(zone_provider) = self.zone_provider {
            ctx = ctx.with_zone_provider(zone_provider);
        }
        let ctx = Arc::new(ctx);

        Ok(AppState {
            verification_service: VerificationService::new(Arc::clone(&ctx)),
            provisioning_service: ProvisioningService::new(Arc::clone(&ctx)),
            sender_service: SenderService::new(Arc::clone(&ctx)),
            reputation_service: ReputationService::new(Arc::clone(&ctx)),
            reconciliation_job: Arc::new(ReconciliationJob::new(
                Arc::clone(&ctx),
                self.reconcile,
            )),
            ctx,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
