//! Sender identity persistence abstraction

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{ComplaintOutcome, SenderIdentity};

/// Sender repository trait
#[async_trait]
pub trait SenderRepository: Send + Sync {
    /// Look up a sender by (lowercase) address
    async fn find_sender_by_email(&self, email: &str) -> CoreResult<Option<SenderIdentity>>;

    async fn create_sender(&self, sender: &SenderIdentity) -> CoreResult<()>;

    /// Atomically increment the complaint counter
    ///
    /// # Errors
    /// `CoreError::SenderNotFound` when the id is unknown.
    async fn increment_sender_complaint(&self, sender_id: &str) -> CoreResult<ComplaintOutcome>;

    /// Disable a sender with a reason
    ///
    /// Returns `false` without touching the row when the sender was already disabled.
    async fn disable_sender(&self, sender_id: &str, reason: &str) -> CoreResult<bool>;
}
