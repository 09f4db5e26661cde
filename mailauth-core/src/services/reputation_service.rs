//! Sender reputation: complaint threshold and bounce tracking

use std::sync::Arc;

use crate::config::{COMPLAINT_DISABLE_REASON, COMPLAINT_DISABLE_THRESHOLD};
use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{ComplaintOutcome, SenderEvent, SenderEventType};

/// Applies delivery signals to sender identities.
pub struct ReputationService {
    ctx: Arc<ServiceContext>,
}

impl ReputationService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Dispatch an inbound event to its handler.
    pub async fn handle_event(&self, event: &SenderEvent) -> CoreResult<()> {
        match event.event_type {
            SenderEventType::Complaint => self.on_complaint(&event.email).await.map(|_| ()),
            SenderEventType::Bounce => {
                self.on_bounce(&event.email, event.reason.as_deref(), false)
                    .await
            }
            SenderEventType::HardBounce => {
                self.on_bounce(&event.email, event.reason.as_deref(), true)
                    .await
            }
        }
    }

    /// Record a complaint. Reaching the threshold disables the sender once.
    ///
    /// Only the complaint that lands exactly on the threshold disables; a sender re-enabled
    /// without a counter reset stays enabled. Returns `None` for addresses that are not
    /// tracked. The returned `disabled` flag is the sender's state after this complaint.
    pub async fn on_complaint(&self, email: &str) -> CoreResult<Option<ComplaintOutcome>> {
        let repo = &self.ctx.sender_repository;
        let email = email.trim().to_ascii_lowercase();
        let Some(sender) = repo.find_sender_by_email(&email).await? else {
            log::debug!("Complaint for untracked sender {email} ignored");
            return Ok(None);
        };

        let outcome = repo.increment_sender_complaint(&sender.id).await?;
        log::info!("Complaint #{} for sender {email}", outcome.new_count);

        if outcome.disabled || outcome.new_count != COMPLAINT_DISABLE_THRESHOLD {
            return Ok(Some(outcome));
        }

        if repo
            .disable_sender(&sender.id, COMPLAINT_DISABLE_REASON)
            .await?
        {
            log::warn!(
                "Sender {email} disabled after {} complaints",
                outcome.new_count
            );
        }
        Ok(Some(ComplaintOutcome {
            new_count: outcome.new_count,
            disabled: true,
        }))
    }

    /// Record a bounce. Bounces do not change sender state.
    pub async fn on_bounce(&self, email: &str, reason: Option<&str>, hard: bool) -> CoreResult<()> {
        let email = email.trim().to_ascii_lowercase();
        if self
            .ctx
            .sender_repository
            .find_sender_by_email(&email)
            .await?
            .is_none()
        {
            log::debug!("Bounce for untracked sender {email} ignored");
            return Ok(());
        }

        let reason = reason.unwrap_or("no reason given");
        if hard {
            log::warn!("Hard bounce for sender {email}: {reason}");
        } else {
            log::info!("Soft bounce for sender {email}: {reason}");
        }
        Ok(())
    }
}
