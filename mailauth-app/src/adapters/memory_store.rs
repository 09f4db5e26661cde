//! In-process store implementing both repositories
//!
//! One lock guards every table, so each repository call is atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use mailauth_core::error::{CoreError, CoreResult};
use mailauth_core::traits::{DomainRepository, SenderRepository};
use mailauth_core::types::{
    ComplaintOutcome, DnsRecord, Domain, DomainStatus, DomainVerificationUpdate,
    ManagedZoneBinding, ProviderBindingUpdate, ProviderIdentityBinding, RecordStatus,
    SenderIdentity,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    domains: HashMap<String, Domain>,
    records: HashMap<String, Vec<DnsRecord>>,
    provider_bindings: HashMap<String, ProviderIdentityBinding>,
    zone_bindings: HashMap<String, ManagedZoneBinding>,
    /// Keyed by sender id
    senders: HashMap<String, SenderIdentity>,
}

impl Tables {
    fn domain_mut(&mut self, id: &str) -> CoreResult<&mut Domain> {
        self.domains
            .get_mut(id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))
    }

    fn sender_mut(&mut self, id: &str) -> CoreResult<&mut SenderIdentity> {
        self.senders
            .get_mut(id)
            .ok_or_else(|| CoreError::SenderNotFound(id.to_string()))
    }
}

/// Volatile storage for single-process deployments and tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn domain_count(&self) -> usize {
        self.tables.read().await.domains.len()
    }
}

#[async_trait]
impl DomainRepository for InMemoryStore {
    async fn get_domain(&self, id: &str) -> CoreResult<Option<Domain>> {
        Ok(self.tables.read().await.domains.get(id).cloned())
    }

    async fn get_domain_by_name(
        &self,
        account_id: &str,
        name: &str,
    ) -> CoreResult<Option<Domain>> {
        Ok(self
            .tables
            .read()
            .await
            .domains
            .values()
            .find(|d| d.account_id == account_id && d.name.as_str() == name)
            .cloned())
    }

    async fn create_domain(&self, domain: &Domain) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .domains
            .values()
            .any(|d| d.account_id == domain.account_id && d.name == domain.name)
        {
            return Err(CoreError::DomainAlreadyExists {
                account_id: domain.account_id.clone(),
                name: domain.name.to_string(),
            });
        }
        tables.domains.insert(domain.id.clone(), domain.clone());
        Ok(())
    }

    async fn delete_domain(&self, id: &str) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .senders
            .values()
            .any(|s| s.domain_id == id && !s.disabled)
        {
            return Err(CoreError::ValidationError(format!(
                "Domain {id} still has enabled senders"
            )));
        }
        if tables.domains.remove(id).is_none() {
            return Err(CoreError::DomainNotFound(id.to_string()));
        }
        tables.records.remove(id);
        tables.provider_bindings.remove(id);
        tables.zone_bindings.remove(id);
        tables.senders.retain(|_, s| s.domain_id != id);
        Ok(())
    }

    async fn list_domains_pending_verification(&self) -> CoreResult<Vec<Domain>> {
        let tables = self.tables.read().await;
        let mut pending: Vec<Domain> = tables
            .domains
            .values()
            .filter(|d| !d.is_verified() && !d.status.is_terminal())
            .cloned()
            .collect();
        pending.sort_by_key(|d| d.created_at);
        Ok(pending)
    }

    async fn update_domain_verification(
        &self,
        id: &str,
        update: &DomainVerificationUpdate,
    ) -> CoreResult<()> {
        self.tables.write().await.domain_mut(id)?.apply(update);
        Ok(())
    }

    async fn set_domain_status(&self, id: &str, status: DomainStatus) -> CoreResult<()> {
        self.tables.write().await.domain_mut(id)?.status = status;
        Ok(())
    }

    async fn create_dns_records(&self, domain_id: &str, records: &[DnsRecord]) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.domain_mut(domain_id)?;
        tables
            .records
            .entry(domain_id.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }

    async fn list_dns_records(&self, domain_id: &str) -> CoreResult<Vec<DnsRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .records
            .get(domain_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_dns_records_status(
        &self,
        domain_id: &str,
        status: RecordStatus,
    ) -> CoreResult<()> {
        if let Some(records) = self.tables.write().await.records.get_mut(domain_id) {
            records.iter_mut().for_each(|r| r.status = status);
        }
        Ok(())
    }

    async fn get_or_create_provider_binding(
        &self,
        domain_id: &str,
    ) -> CoreResult<ProviderIdentityBinding> {
        let mut tables = self.tables.write().await;
        tables.domain_mut(domain_id)?;
        Ok(tables
            .provider_bindings
            .entry(domain_id.to_string())
            .or_insert_with(|| ProviderIdentityBinding::new(domain_id))
            .clone())
    }

    async fn update_provider_binding(
        &self,
        domain_id: &str,
        update: &ProviderBindingUpdate,
    ) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        let binding = tables.provider_bindings.get_mut(domain_id).ok_or_else(|| {
            CoreError::StorageError(format!("No provider binding for domain {domain_id}"))
        })?;
        binding.apply(update);
        Ok(())
    }

    async fn get_zone_binding(&self, domain_id: &str) -> CoreResult<Option<ManagedZoneBinding>> {
        Ok(self.tables.read().await.zone_bindings.get(domain_id).cloned())
    }

    async fn save_zone_binding(&self, binding: &ManagedZoneBinding) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.domain_mut(&binding.domain_id)?;
        tables
            .zone_bindings
            .insert(binding.domain_id.clone(), binding.clone());
        Ok(())
    }
}

#[async_trait]
impl SenderRepository for InMemoryStore {
    async fn find_sender_by_email(&self, email: &str) -> CoreResult<Option<SenderIdentity>> {
        Ok(self
            .tables
            .read()
            .await
            .senders
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn create_sender(&self, sender: &SenderIdentity) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.domain_mut(&sender.domain_id)?;
        if tables.senders.values().any(|s| s.email == sender.email) {
            return Err(CoreError::ValidationError(format!(
                "Sender {} already exists",
                sender.email
            )));
        }
        tables.senders.insert(sender.id.clone(), sender.clone());
        Ok(())
    }

    async fn increment_sender_complaint(&self, sender_id: &str) -> CoreResult<ComplaintOutcome> {
        let mut tables = self.tables.write().await;
        let sender = tables.sender_mut(sender_id)?;
        sender.complaint_count = sender.complaint_count.saturating_add(1);
        Ok(ComplaintOutcome {
            new_count: sender.complaint_count,
            disabled: sender.disabled,
        })
    }

    async fn disable_sender(&self, sender_id: &str, reason: &str) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        let sender = tables.sender_mut(sender_id)?;
        if sender.disabled {
            return Ok(false);
        }
        sender.disabled = true;
        sender.disabled_reason = Some(reason.to_string());
        Ok(true)
    }
}
