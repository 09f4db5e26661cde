use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An address allowed to send through the platform for one domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SenderIdentity {
    pub id: String,
    pub domain_id: String,
    /// Lowercase address.
    pub email: String,
    /// Sending-provider reference, when the provider returned one.
    pub external_reference: Option<String>,
    pub verified: bool,
    /// Only ever increases.
    pub complaint_count: u32,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SenderIdentity {
    pub fn new(domain_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            domain_id: domain_id.into(),
            email: email.into(),
            external_reference: None,
            verified: false,
            complaint_count: 0,
            disabled: false,
            disabled_reason: None,
            created_at: Utc::now(),
        }
    }
}

/// Counter state after a complaint was recorded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintOutcome {
    pub new_count: u32,
    /// Whether the sender was already disabled when the complaint arrived.
    pub disabled: bool,
}

/// Answer to "may this address send right now".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum SendAuthorization {
    Authorized,
    DomainNotVerified { domain: String },
    SenderDisabled { reason: String },
    UnknownSender,
}

impl SendAuthorization {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}
