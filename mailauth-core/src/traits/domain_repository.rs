//! Domain persistence abstraction

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{
    DnsRecord, Domain, DomainStatus, DomainVerificationUpdate, ManagedZoneBinding,
    ProviderBindingUpdate, ProviderIdentityBinding, RecordStatus,
};

/// Domain repository trait
///
/// Implementations are responsible for atomicity of a single row update; the core never
/// needs cross-row transactions.
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Get a domain by id
    async fn get_domain(&self, id: &str) -> CoreResult<Option<Domain>>;

    /// Get a domain by account and (normalised) name
    async fn get_domain_by_name(&self, account_id: &str, name: &str)
        -> CoreResult<Option<Domain>>;

    /// Insert a new domain
    ///
    /// # Errors
    /// `CoreError::DomainAlreadyExists` when the account already has a domain with this name.
    async fn create_domain(&self, domain: &Domain) -> CoreResult<()>;

    /// Delete a domain together with its records and bindings
    ///
    /// # Errors
    /// `CoreError::ValidationError` while an enabled sender still references the domain.
    async fn delete_domain(&self, id: &str) -> CoreResult<()>;

    /// Domains still awaiting verification (`unverified` / `pending`) that are not
    /// `failed` or `expired`
    async fn list_domains_pending_verification(&self) -> CoreResult<Vec<Domain>>;

    /// Write the verification fields of one domain
    async fn update_domain_verification(
        &self,
        id: &str,
        update: &DomainVerificationUpdate,
    ) -> CoreResult<()>;

    /// Change only the lifecycle status (expiry)
    async fn set_domain_status(&self, id: &str, status: DomainStatus) -> CoreResult<()>;

    /// Store the required records of a domain
    async fn create_dns_records(&self, domain_id: &str, records: &[DnsRecord]) -> CoreResult<()>;

    async fn list_dns_records(&self, domain_id: &str) -> CoreResult<Vec<DnsRecord>>;

    /// Set the status of every record of the domain
    async fn set_dns_records_status(&self, domain_id: &str, status: RecordStatus)
        -> CoreResult<()>;

    /// The sending-provider binding of a domain, created empty on first access
    async fn get_or_create_provider_binding(
        &self,
        domain_id: &str,
    ) -> CoreResult<ProviderIdentityBinding>;

    /// Partially update the sending-provider binding
    async fn update_provider_binding(
        &self,
        domain_id: &str,
        update: &ProviderBindingUpdate,
    ) -> CoreResult<()>;

    /// The managed zone binding, managed-mode domains only
    async fn get_zone_binding(&self, domain_id: &str) -> CoreResult<Option<ManagedZoneBinding>>;

    /// Insert or replace the managed zone binding
    async fn save_zone_binding(&self, binding: &ManagedZoneBinding) -> CoreResult<()>;
}
