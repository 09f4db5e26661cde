//! Test helpers
//!
//! In-memory mocks of every seam in [`ServiceContext`] plus a ready-made test context.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mailauth_provider::{
    CreateRecordOutcome, CreateZoneRecordRequest, DnsRecordType, DnsZoneProvider, ProviderError,
    RecordPurpose, RequiredDnsRecord, SenderRegistration, SendingDomainIdentity,
    SendingDomainStatus, SendingProvider, Zone, ZoneRecord, ZoneStatus,
};
use tokio::sync::RwLock;

use crate::config::PlatformConfig;
use crate::dns::{DnsResolver, LookupError};
use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::{DomainRepository, SenderRepository};
use crate::types::{
    ComplaintOutcome, DnsOwnership, DnsRecord, Domain, DomainName, DomainStatus,
    DomainVerificationUpdate, ManagedZoneBinding, ProviderBindingUpdate, ProviderIdentityBinding,
    RecordStatus, SenderIdentity,
};

const SPF_INCLUDE: &str = "_spf.platform.com";
const DKIM_MARKER: &str = "dkim.platform.com";
const MOCK_NAME_SERVERS: [&str; 2] = ["ns1.mock-dns.test", "ns2.mock-dns.test"];

fn dkim_target(selector: &str, domain: &str) -> String {
    format!("{selector}.{}.{DKIM_MARKER}", domain.replace('.', "-"))
}

fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

// ===== MockDomainRepository =====

#[derive(Default)]
pub struct MockDomainRepository {
    domains: RwLock<HashMap<String, Domain>>,
    records: RwLock<HashMap<String, Vec<DnsRecord>>>,
    provider_bindings: RwLock<HashMap<String, ProviderIdentityBinding>>,
    zone_bindings: RwLock<HashMap<String, ManagedZoneBinding>>,
    verification_writes: AtomicUsize,
}

impl MockDomainRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `update_domain_verification` calls so far
    pub fn verification_writes(&self) -> usize {
        self.verification_writes.load(Ordering::SeqCst)
    }

    /// Overwrite a stored domain, bypassing the duplicate check
    pub async fn put_domain(&self, domain: Domain) {
        self.domains.write().await.insert(domain.id.clone(), domain);
    }
}

#[async_trait]
impl DomainRepository for MockDomainRepository {
    async fn get_domain(&self, id: &str) -> CoreResult<Option<Domain>> {
        Ok(self.domains.read().await.get(id).cloned())
    }

    async fn get_domain_by_name(
        &self,
        account_id: &str,
        name: &str,
    ) -> CoreResult<Option<Domain>> {
        Ok(self
            .domains
            .read()
            .await
            .values()
            .find(|d| d.account_id == account_id && d.name.as_str() == name)
            .cloned())
    }

    async fn create_domain(&self, domain: &Domain) -> CoreResult<()> {
        let mut domains = self.domains.write().await;
        if domains
            .values()
            .any(|d| d.account_id == domain.account_id && d.name == domain.name)
        {
            return Err(CoreError::DomainAlreadyExists {
                account_id: domain.account_id.clone(),
                name: domain.name.to_string(),
            });
        }
        domains.insert(domain.id.clone(), domain.clone());
        Ok(())
    }

    async fn delete_domain(&self, id: &str) -> CoreResult<()> {
        self.domains.write().await.remove(id);
        self.records.write().await.remove(id);
        self.provider_bindings.write().await.remove(id);
        self.zone_bindings.write().await.remove(id);
        Ok(())
    }

    async fn list_domains_pending_verification(&self) -> CoreResult<Vec<Domain>> {
        let mut pending: Vec<Domain> = self
            .domains
            .read()
            .await
            .values()
            .filter(|d| !d.is_verified() && !d.status.is_terminal())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(pending)
    }

    async fn update_domain_verification(
        &self,
        id: &str,
        update: &DomainVerificationUpdate,
    ) -> CoreResult<()> {
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))?;
        domain.apply(update);
        self.verification_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_domain_status(&self, id: &str, status: DomainStatus) -> CoreResult<()> {
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))?;
        domain.status = status;
        Ok(())
    }

    async fn create_dns_records(&self, domain_id: &str, records: &[DnsRecord]) -> CoreResult<()> {
        self.records
            .write()
            .await
            .entry(domain_id.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }

    async fn list_dns_records(&self, domain_id: &str) -> CoreResult<Vec<DnsRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(domain_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_dns_records_status(
        &self,
        domain_id: &str,
        status: RecordStatus,
    ) -> CoreResult<()> {
        if let Some(records) = self.records.write().await.get_mut(domain_id) {
            for record in records {
                record.status = status;
            }
        }
        Ok(())
    }

    async fn get_or_create_provider_binding(
        &self,
        domain_id: &str,
    ) -> CoreResult<ProviderIdentityBinding> {
        Ok(self
            .provider_bindings
            .write()
            .await
            .entry(domain_id.to_string())
            .or_insert_with(|| ProviderIdentityBinding::new(domain_id))
            .clone())
    }

    async fn update_provider_binding(
        &self,
        domain_id: &str,
        update: &ProviderBindingUpdate,
    ) -> CoreResult<()> {
        self.provider_bindings
            .write()
            .await
            .entry(domain_id.to_string())
            .or_insert_with(|| ProviderIdentityBinding::new(domain_id))
            .apply(update);
        Ok(())
    }

    async fn get_zone_binding(&self, domain_id: &str) -> CoreResult<Option<ManagedZoneBinding>> {
        Ok(self.zone_bindings.read().await.get(domain_id).cloned())
    }

    async fn save_zone_binding(&self, binding: &ManagedZoneBinding) -> CoreResult<()> {
        self.zone_bindings
            .write()
            .await
            .insert(binding.domain_id.clone(), binding.clone());
        Ok(())
    }
}

// ===== MockSenderRepository =====

#[derive(Default)]
pub struct MockSenderRepository {
    senders: RwLock<HashMap<String, SenderIdentity>>,
    disable_calls: AtomicUsize,
}

impl MockSenderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable_calls(&self) -> usize {
        self.disable_calls.load(Ordering::SeqCst)
    }

    /// Simulate an administrator editing the disabled reason
    pub async fn set_disabled_reason(&self, email: &str, reason: &str) {
        if let Some(sender) = self.senders.write().await.get_mut(email) {
            sender.disabled_reason = Some(reason.to_string());
        }
    }

    /// Manual re-enable that leaves the complaint counter alone
    pub async fn re_enable(&self, email: &str) {
        if let Some(sender) = self.senders.write().await.get_mut(email) {
            sender.disabled = false;
            sender.disabled_reason = None;
        }
    }
}

#[async_trait]
impl SenderRepository for MockSenderRepository {
    async fn find_sender_by_email(&self, email: &str) -> CoreResult<Option<SenderIdentity>> {
        Ok(self.senders.read().await.get(email).cloned())
    }

    async fn create_sender(&self, sender: &SenderIdentity) -> CoreResult<()> {
        let mut senders = self.senders.write().await;
        if senders.contains_key(&sender.email) {
            return Err(CoreError::ValidationError(format!(
                "Sender {} already exists",
                sender.email
            )));
        }
        senders.insert(sender.email.clone(), sender.clone());
        Ok(())
    }

    async fn increment_sender_complaint(&self, sender_id: &str) -> CoreResult<ComplaintOutcome> {
        let mut senders = self.senders.write().await;
        let sender = senders
            .values_mut()
            .find(|s| s.id == sender_id)
            .ok_or_else(|| CoreError::SenderNotFound(sender_id.to_string()))?;
        sender.complaint_count += 1;
        Ok(ComplaintOutcome {
            new_count: sender.complaint_count,
            disabled: sender.disabled,
        })
    }

    async fn disable_sender(&self, sender_id: &str, reason: &str) -> CoreResult<bool> {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        let mut senders = self.senders.write().await;
        let sender = senders
            .values_mut()
            .find(|s| s.id == sender_id)
            .ok_or_else(|| CoreError::SenderNotFound(sender_id.to_string()))?;
        if sender.disabled {
            return Ok(false);
        }
        sender.disabled = true;
        sender.disabled_reason = Some(reason.to_string());
        Ok(true)
    }
}

// ===== MockResolver =====

#[derive(Default)]
pub struct MockResolver {
    txt: RwLock<HashMap<String, Vec<String>>>,
    cname: RwLock<HashMap<String, String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_txt(&self, name: &str, records: &[&str]) {
        self.txt.write().await.insert(
            normalize(name),
            records.iter().map(ToString::to_string).collect(),
        );
    }

    pub async fn set_cname(&self, name: &str, target: &str) {
        self.cname
            .write()
            .await
            .insert(normalize(name), target.to_string());
    }

    /// Drop every record at `name`
    pub async fn remove(&self, name: &str) {
        let name = normalize(name);
        self.txt.write().await.remove(&name);
        self.cname.write().await.remove(&name);
    }
}

#[async_trait]
impl DnsResolver for MockResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupError> {
        self.txt
            .read()
            .await
            .get(&normalize(name))
            .cloned()
            .ok_or(LookupError::NotFound)
    }

    async fn lookup_cname(&self, name: &str) -> Result<String, LookupError> {
        self.cname
            .read()
            .await
            .get(&normalize(name))
            .cloned()
            .ok_or(LookupError::NotFound)
    }
}

// ===== MockSendingProvider =====

#[derive(Default)]
pub struct MockSendingProvider {
    identities: RwLock<HashMap<String, SendingDomainIdentity>>,
    status_delays: RwLock<HashMap<String, Duration>>,
    existing_senders: RwLock<HashSet<String>>,
    /// If Some, register_domain returns this error
    register_error: RwLock<Option<ProviderError>>,
    /// If Some, trigger_recheck returns this error
    recheck_error: RwLock<Option<ProviderError>>,
    register_calls: AtomicUsize,
    recheck_calls: AtomicUsize,
    status_calls: AtomicUsize,
    sender_calls: AtomicUsize,
}

impl MockSendingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a domain, bypassing the call counters
    pub async fn register(&self, domain: &str, verified: bool) {
        self.identities
            .write()
            .await
            .insert(normalize(domain), brevo_identity(domain, verified));
    }

    /// Make `get_domain_status` for `domain` sleep before answering
    pub async fn delay_status(&self, domain: &str, delay: Duration) {
        self.status_delays
            .write()
            .await
            .insert(normalize(domain), delay);
    }

    pub async fn existing_sender(&self, email: &str) {
        self.existing_senders
            .write()
            .await
            .insert(email.to_ascii_lowercase());
    }

    pub async fn fail_register(&self, err: Option<ProviderError>) {
        *self.register_error.write().await = err;
    }

    pub async fn fail_recheck(&self, err: Option<ProviderError>) {
        *self.recheck_error.write().await = err;
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn recheck_calls(&self) -> usize {
        self.recheck_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn sender_calls(&self) -> usize {
        self.sender_calls.load(Ordering::SeqCst)
    }

    fn not_found(domain: &str) -> ProviderError {
        ProviderError::DomainNotFound {
            provider: "mock".to_string(),
            domain: domain.to_string(),
            raw_message: None,
        }
    }
}

#[async_trait]
impl SendingProvider for MockSendingProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn register_domain(&self, name: &str) -> mailauth_provider::Result<SendingDomainIdentity> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref err) = *self.register_error.read().await {
            return Err(err.clone());
        }
        let mut identities = self.identities.write().await;
        if identities.contains_key(&normalize(name)) {
            return Err(ProviderError::DomainExists {
                provider: "mock".to_string(),
                domain: name.to_string(),
                raw_message: None,
            });
        }
        let identity = brevo_identity(name, false);
        identities.insert(normalize(name), identity.clone());
        Ok(identity)
    }

    async fn get_domain_identity(
        &self,
        name: &str,
    ) -> mailauth_provider::Result<SendingDomainIdentity> {
        self.identities
            .read()
            .await
            .get(&normalize(name))
            .cloned()
            .ok_or_else(|| Self::not_found(name))
    }

    async fn get_domain_status(&self, name: &str) -> mailauth_provider::Result<SendingDomainStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.status_delays.read().await.get(&normalize(name)).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.get_domain_identity(name).await.map(Into::into)
    }

    async fn trigger_recheck(&self, name: &str) -> mailauth_provider::Result<()> {
        self.recheck_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref err) = *self.recheck_error.read().await {
            return Err(err.clone());
        }
        if self.identities.read().await.contains_key(&normalize(name)) {
            Ok(())
        } else {
            Err(Self::not_found(name))
        }
    }

    async fn register_sender(
        &self,
        email: &str,
        _display_name: &str,
    ) -> mailauth_provider::Result<SenderRegistration> {
        let n = self.sender_calls.fetch_add(1, Ordering::SeqCst);
        if self.existing_senders.read().await.contains(email) {
            return Err(ProviderError::SenderExists {
                provider: "mock".to_string(),
                email: email.to_string(),
                raw_message: None,
            });
        }
        Ok(SenderRegistration {
            reference: format!("sender-{}", n + 1),
            email: email.to_string(),
            authenticated: true,
        })
    }
}

// ===== MockZoneProvider =====

#[derive(Default)]
pub struct MockZoneProvider {
    zones: RwLock<HashMap<String, Zone>>,
    records: RwLock<HashMap<String, Vec<ZoneRecord>>>,
    rejected: RwLock<HashSet<String>>,
    next_id: AtomicUsize,
    create_zone_calls: AtomicUsize,
}

impl MockZoneProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Seed an existing zone
    pub async fn add_zone(&self, name: &str, status: ZoneStatus) -> Zone {
        let zone = Zone {
            id: self.next_id("zone"),
            name: normalize(name),
            name_servers: MOCK_NAME_SERVERS.iter().map(ToString::to_string).collect(),
            status,
        };
        self.zones.write().await.insert(zone.id.clone(), zone.clone());
        zone
    }

    pub async fn set_status(&self, zone_id: &str, status: ZoneStatus) {
        if let Some(zone) = self.zones.write().await.get_mut(zone_id) {
            zone.status = status;
        }
    }

    pub async fn record_count(&self, zone_id: &str) -> usize {
        self.records.read().await.get(zone_id).map_or(0, Vec::len)
    }

    /// Fail every create for records named `name`
    pub async fn reject_record(&self, name: &str) {
        self.rejected.write().await.insert(name.to_string());
    }

    pub async fn accept_all(&self) {
        self.rejected.write().await.clear();
    }

    pub fn create_zone_calls(&self) -> usize {
        self.create_zone_calls.load(Ordering::SeqCst)
    }

    fn zone_not_found(zone_id: &str) -> ProviderError {
        ProviderError::DomainNotFound {
            provider: "mock-dns".to_string(),
            domain: zone_id.to_string(),
            raw_message: None,
        }
    }
}

#[async_trait]
impl DnsZoneProvider for MockZoneProvider {
    fn id(&self) -> &'static str {
        "mock-dns"
    }

    async fn create_zone(&self, domain: &str) -> mailauth_provider::Result<Zone> {
        self.create_zone_calls.fetch_add(1, Ordering::SeqCst);
        if self.get_zone_by_name(domain).await?.is_some() {
            return Err(ProviderError::ZoneExists {
                provider: "mock-dns".to_string(),
                domain: domain.to_string(),
                raw_message: None,
            });
        }
        Ok(self.add_zone(domain, ZoneStatus::Pending).await)
    }

    async fn get_zone(&self, zone_id: &str) -> mailauth_provider::Result<Zone> {
        self.zones
            .read()
            .await
            .get(zone_id)
            .cloned()
            .ok_or_else(|| Self::zone_not_found(zone_id))
    }

    async fn get_zone_by_name(&self, domain: &str) -> mailauth_provider::Result<Option<Zone>> {
        let name = normalize(domain);
        Ok(self
            .zones
            .read()
            .await
            .values()
            .find(|z| z.name == name)
            .cloned())
    }

    async fn create_record(
        &self,
        req: &CreateZoneRecordRequest,
    ) -> mailauth_provider::Result<CreateRecordOutcome> {
        if self.rejected.read().await.contains(&req.name) {
            return Err(ProviderError::InvalidParameter {
                provider: "mock-dns".to_string(),
                param: "name".to_string(),
                detail: format!("record {} rejected", req.name),
            });
        }
        if !self.zones.read().await.contains_key(&req.zone_id) {
            return Err(Self::zone_not_found(&req.zone_id));
        }

        let mut records = self.records.write().await;
        let zone_records = records.entry(req.zone_id.clone()).or_default();
        if zone_records.iter().any(|r| {
            r.record_type == req.record_type && r.name == req.name && r.value == req.value
        }) {
            return Ok(CreateRecordOutcome::Skipped {
                name: req.name.clone(),
            });
        }

        let record = ZoneRecord {
            id: self.next_id("rec"),
            zone_id: req.zone_id.clone(),
            record_type: req.record_type,
            name: req.name.clone(),
            value: req.value.clone(),
            ttl: req.ttl,
            priority: req.priority,
        };
        zone_records.push(record.clone());
        Ok(CreateRecordOutcome::Created(record))
    }

    async fn list_records(&self, zone_id: &str) -> mailauth_provider::Result<Vec<ZoneRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(zone_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> mailauth_provider::Result<()> {
        if let Some(records) = self.records.write().await.get_mut(zone_id) {
            records.retain(|r| r.id != record_id);
        }
        Ok(())
    }
}

// ===== Fixtures =====

/// Platform settings used by every test context
pub fn test_platform_config() -> PlatformConfig {
    PlatformConfig {
        spf_include: SPF_INCLUDE.to_string(),
        dkim_cname_marker: DKIM_MARKER.to_string(),
        default_dkim_selector: "s1".to_string(),
        ..PlatformConfig::default()
    }
}

/// A provider identity with two delegated DKIM selectors, an ownership code and a DMARC
/// suggestion.
pub fn brevo_identity(domain: &str, verified: bool) -> SendingDomainIdentity {
    let domain = normalize(domain);
    let record = |purpose, record_type, host: &str, value: String| RequiredDnsRecord {
        purpose,
        record_type,
        host: host.to_string(),
        value,
        priority: None,
        provider_verified: verified,
    };
    SendingDomainIdentity {
        reference: format!("ref-{domain}"),
        domain_name: domain.clone(),
        dns_records: vec![
            record(
                RecordPurpose::Dkim,
                DnsRecordType::Cname,
                "s1._domainkey",
                dkim_target("s1", &domain),
            ),
            record(
                RecordPurpose::Dkim,
                DnsRecordType::Cname,
                "s2._domainkey",
                dkim_target("s2", &domain),
            ),
            record(
                RecordPurpose::Verification,
                DnsRecordType::Txt,
                "@",
                "mock-code:0f3a9c".to_string(),
            ),
            record(
                RecordPurpose::Dmarc,
                DnsRecordType::Txt,
                "_dmarc",
                "v=DMARC1; p=none; rua=mailto:rua@platform.com".to_string(),
            ),
        ],
        authenticated: verified,
        verified,
    }
}

/// Publish the SPF include and the default DKIM CNAME for `domain`
pub async fn publish_valid_dns(resolver: &MockResolver, domain: &str) {
    let spf = format!("v=spf1 include:{SPF_INCLUDE} ~all");
    resolver.set_txt(domain, &[spf.as_str()]).await;
    resolver
        .set_cname(&format!("s1._domainkey.{domain}"), &dkim_target("s1", domain))
        .await;
}

/// Store a fresh domain with pending SPF and `s1` DKIM records
#[allow(clippy::unwrap_used)]
pub async fn seed_domain(
    repo: &MockDomainRepository,
    name: &str,
    ownership: DnsOwnership,
) -> Domain {
    let domain = Domain::new("acc-1", DomainName::parse(name).unwrap(), ownership);
    repo.create_domain(&domain).await.unwrap();

    let record = |purpose, record_type, host: &str, value: String, selector: Option<&str>| {
        DnsRecord {
            id: uuid::Uuid::new_v4().to_string(),
            domain_id: domain.id.clone(),
            purpose,
            record_type,
            name: host.to_string(),
            value,
            priority: None,
            selector: selector.map(ToString::to_string),
            status: RecordStatus::Pending,
        }
    };
    let records = [
        record(
            RecordPurpose::Spf,
            DnsRecordType::Txt,
            "@",
            format!("v=spf1 include:{SPF_INCLUDE} ~all"),
            None,
        ),
        record(
            RecordPurpose::Dkim,
            DnsRecordType::Cname,
            "s1._domainkey",
            dkim_target("s1", domain.name.as_str()),
            Some("s1"),
        ),
    ];
    repo.create_dns_records(&domain.id, &records).await.unwrap();
    domain
}

/// Every mock, shared with the context that uses them
pub struct TestContext {
    pub ctx: Arc<ServiceContext>,
    pub domains: Arc<MockDomainRepository>,
    pub senders: Arc<MockSenderRepository>,
    pub resolver: Arc<MockResolver>,
    pub sending: Arc<MockSendingProvider>,
    pub zones: Arc<MockZoneProvider>,
}

/// Build a test context with managed DNS enabled
pub fn create_test_context() -> TestContext {
    let domains = Arc::new(MockDomainRepository::new());
    let senders = Arc::new(MockSenderRepository::new());
    let resolver = Arc::new(MockResolver::new());
    let sending = Arc::new(MockSendingProvider::new());
    let zones = Arc::new(MockZoneProvider::new());

    let ctx = ServiceContext::new(
        domains.clone(),
        senders.clone(),
        resolver.clone(),
        sending.clone(),
        test_platform_config(),
    )
    .with_zone_provider(zones.clone());

    TestContext {
        ctx: Arc::new(ctx),
        domains,
        senders,
        resolver,
        sending,
        zones,
    }
}
