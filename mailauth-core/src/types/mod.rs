//! Type definitions

mod binding;
mod dns_record;
mod domain;
mod event;
mod provisioning;
mod sender;
mod verification;

pub use binding::{ManagedZoneBinding, ProviderBindingUpdate, ProviderIdentityBinding};
pub use dns_record::{dkim_selectors, DnsRecord, RecordStatus};
pub use domain::{
    DnsOwnership, Domain, DomainName, DomainStatus, DomainVerificationUpdate, VerificationStatus,
};
pub use event::{SenderEvent, SenderEventType};
pub use provisioning::{ProvisionOutcome, ProvisionRequest};
pub use sender::{ComplaintOutcome, SendAuthorization, SenderIdentity};
pub use verification::{
    Alignment, DkimRecordType, DkimResult, DmarcPolicy, DmarcResult, DmarcTags, ProviderCheck,
    SpfResult, VerificationPass,
};

// Re-export public types from the provider library
pub use mailauth_provider::{
    BatchCreateFailure, DnsRecordType, MechanismStatus, RecordPurpose, RequiredDnsRecord,
    SendingDomainIdentity, SendingDomainStatus, ZoneStatus,
};
