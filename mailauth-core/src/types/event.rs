use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Delivery signal kinds that affect sender reputation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum SenderEventType {
    Complaint,
    Bounce,
    HardBounce,
}

impl SenderEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complaint => "complaint",
            Self::Bounce => "bounce",
            Self::HardBounce => "hard-bounce",
        }
    }
}

impl fmt::Display for SenderEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SenderEventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "complaint" | "spam" => Ok(Self::Complaint),
            "bounce" | "softbounce" => Ok(Self::Bounce),
            "hardbounce" => Ok(Self::HardBounce),
            _ => Err(CoreError::ValidationError(format!(
                "Unknown sender event type: {s}"
            ))),
        }
    }
}

impl TryFrom<String> for SenderEventType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SenderEventType> for String {
    fn from(kind: SenderEventType) -> Self {
        kind.as_str().to_string()
    }
}

/// An inbound delivery event as handed over by the webhook collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SenderEvent {
    pub event_type: SenderEventType,
    pub email: String,
    #[serde(default)]
    pub reason: Option<String>,
}
