use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    BatchCreateFailure, BatchCreateResult, CreateRecordOutcome, CreateZoneRecordRequest,
    SenderRegistration, SendingDomainIdentity, SendingDomainStatus, Zone, ZoneRecord,
};

/// Raw API error (internal)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code (format differs per provider)
    pub code: Option<String>,
    /// Original error message
    pub message: String,
    /// HTTP status of the failed response
    pub status: Option<u16>,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Context used while mapping an error (internal)
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record name (for `RecordExists`)
    pub record_name: Option<String>,
    /// Record ID (for `RecordNotFound`)
    pub record_id: Option<String>,
    /// Domain or zone name (for `ZoneExists`, `DomainExists`, `DomainNotFound`)
    pub domain: Option<String>,
    /// Sender address (for `SenderExists`)
    pub email: Option<String>,
}

impl ErrorContext {
    pub fn domain(domain: &str) -> Self {
        Self {
            domain: Some(domain.to_string()),
            ..Self::default()
        }
    }
}

/// Maps raw provider API errors to [`ProviderError`] (internal)
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: parse error
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error (fallback)
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            status: raw.status,
            raw_message: raw.message,
        }
    }
}

/// Managed DNS provider: hosts customer zones so the platform can publish records itself.
#[async_trait]
pub trait DnsZoneProvider: Send + Sync {
    /// Provider identifier
    fn id(&self) -> &'static str;

    /// Create a zone for `domain`.
    ///
    /// Fails with [`ProviderError::ZoneExists`] when the account already has it.
    async fn create_zone(&self, domain: &str) -> Result<Zone>;

    /// Fetch a zone by provider id.
    async fn get_zone(&self, zone_id: &str) -> Result<Zone>;

    /// Look up a zone by apex name. `None` when the account has no such zone.
    async fn get_zone_by_name(&self, domain: &str) -> Result<Option<Zone>>;

    /// Create a record. An identical existing record is skipped, not an error.
    async fn create_record(&self, req: &CreateZoneRecordRequest) -> Result<CreateRecordOutcome>;

    /// All records of a zone.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<ZoneRecord>>;

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;

    /// Create several records.
    ///
    /// The default implementation calls `create_record()` concurrently and collects
    /// created/skipped/failed results. One failure does not cancel the others.
    async fn batch_create_records(
        &self,
        requests: &[CreateZoneRecordRequest],
    ) -> Result<BatchCreateResult> {
        let futures: Vec<_> = requests.iter().map(|req| self.create_record(req)).collect();
        let results = futures::future::join_all(futures).await;

        let mut batch = BatchCreateResult::default();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(CreateRecordOutcome::Created(record)) => batch.created.push(record),
                Ok(CreateRecordOutcome::Skipped { name }) => batch.skipped.push(name),
                Err(e) => batch.failures.push(BatchCreateFailure {
                    request_index: i,
                    record_name: requests[i].name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(batch)
    }
}

/// Transactional email provider: confirms domains and senders independently of DNS.
#[async_trait]
pub trait SendingProvider: Send + Sync {
    /// Provider identifier
    fn id(&self) -> &'static str;

    /// Register a sending domain.
    ///
    /// Fails with [`ProviderError::DomainExists`] when it is already registered; callers
    /// fetch the existing identity with [`get_domain_identity`](Self::get_domain_identity).
    async fn register_domain(&self, name: &str) -> Result<SendingDomainIdentity>;

    /// Current identity, including the DNS records the provider requires.
    async fn get_domain_identity(&self, name: &str) -> Result<SendingDomainIdentity>;

    /// Provider-reported authentication status.
    async fn get_domain_status(&self, name: &str) -> Result<SendingDomainStatus> {
        self.get_domain_identity(name).await.map(Into::into)
    }

    /// Ask the provider to re-check the domain's DNS records now.
    async fn trigger_recheck(&self, name: &str) -> Result<()>;

    /// Register a sender address.
    ///
    /// Fails with [`ProviderError::SenderExists`] when the address is already known.
    async fn register_sender(&self, email: &str, display_name: &str)
    -> Result<SenderRegistration>;
}
