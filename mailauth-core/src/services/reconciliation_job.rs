//! Scheduled reconciliation of unverified domains

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::ReconcileConfig;
use crate::error::CoreResult;
use crate::services::{
    log_core_error, ProvisioningService, ServiceContext, VerificationService,
};
use crate::types::{dkim_selectors, DnsOwnership, Domain, DomainStatus, ProviderCheck};

/// In-flight flag owned by one job instance.
///
/// Process-local; a multi-instance deployment needs a distributed lock in its place.
#[derive(Debug, Default)]
pub struct JobLock {
    running: AtomicBool,
}

impl JobLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another guard is alive.
    pub fn try_acquire(&self) -> Option<JobGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| JobGuard { lock: self })
    }

    pub fn is_held(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the [`JobLock`] on drop.
#[derive(Debug)]
pub struct JobGuard<'a> {
    lock: &'a JobLock,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.lock.running.store(false, Ordering::Release);
    }
}

/// A domain the pass could not reconcile.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainFailure {
    pub domain_id: String,
    pub domain_name: String,
    pub reason: String,
}

/// Summary of one pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub checked: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub expired: usize,
    pub failures: Vec<DomainFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "report", rename_all = "camelCase")]
pub enum ReconcileOutcome {
    /// A previous pass was still running.
    Skipped,
    Completed(ReconcileReport),
}

enum DomainChange {
    Updated,
    Unchanged,
    Expired,
}

/// Re-checks every domain still awaiting verification.
pub struct ReconciliationJob {
    ctx: Arc<ServiceContext>,
    verification: VerificationService,
    provisioning: ProvisioningService,
    config: ReconcileConfig,
    lock: JobLock,
}

impl ReconciliationJob {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, config: ReconcileConfig) -> Self {
        Self {
            verification: VerificationService::new(ctx.clone()),
            provisioning: ProvisioningService::new(ctx.clone()),
            ctx,
            config,
            lock: JobLock::new(),
        }
    }

    pub fn lock(&self) -> &JobLock {
        &self.lock
    }

    /// Run one pass unless one is already in flight.
    pub async fn run_once(&self) -> CoreResult<ReconcileOutcome> {
        let Some(_guard) = self.lock.try_acquire() else {
            return Ok(ReconcileOutcome::Skipped);
        };
        self.run_pass().await.map(ReconcileOutcome::Completed)
    }

    /// Start the interval loop. Each tick runs its pass as a separate task, so a slow
    /// pass makes later ticks skip instead of queueing.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.config.interval().max(Duration::from_secs(1));
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            log::info!("[reconcile] Scheduler started, every {}s", period.as_secs());

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let job = Arc::clone(&self);
                        tokio::spawn(async move { job.run_and_log().await });
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            log::info!("[reconcile] Scheduler stopped");
        })
    }

    async fn run_and_log(&self) {
        match self.run_once().await {
            Ok(ReconcileOutcome::Skipped) => {
                log::info!("[reconcile] Previous pass still running, skipping");
            }
            Ok(ReconcileOutcome::Completed(report)) => {
                log::info!(
                    "[reconcile] Pass done: {} checked, {} updated, {} unchanged, {} expired, {} failed",
                    report.checked,
                    report.updated,
                    report.unchanged,
                    report.expired,
                    report.failures.len()
                );
            }
            Err(e) => log_core_error("[reconcile] Pass aborted", &e),
        }
    }

    async fn run_pass(&self) -> CoreResult<ReconcileReport> {
        let domains = self
            .ctx
            .domain_repository
            .list_domains_pending_verification()
            .await?;
        let per_domain = self.config.per_domain_timeout();
        let mut report = ReconcileReport::default();

        for domain in domains {
            report.checked += 1;
            match tokio::time::timeout(per_domain, self.reconcile_domain(&domain)).await {
                Ok(Ok(DomainChange::Updated)) => report.updated += 1,
                Ok(Ok(DomainChange::Unchanged)) => report.unchanged += 1,
                Ok(Ok(DomainChange::Expired)) => report.expired += 1,
                Ok(Err(e)) => {
                    log_core_error(&format!("[reconcile] {}", domain.name), &e);
                    report.failures.push(DomainFailure {
                        domain_id: domain.id.clone(),
                        domain_name: domain.name.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    log::warn!(
                        "[reconcile] {} timed out after {}s",
                        domain.name,
                        per_domain.as_secs()
                    );
                    report.failures.push(DomainFailure {
                        domain_id: domain.id.clone(),
                        domain_name: domain.name.to_string(),
                        reason: format!("timed out after {}s", per_domain.as_secs()),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn reconcile_domain(&self, domain: &Domain) -> CoreResult<DomainChange> {
        let provider = &self.ctx.sending_provider;
        let name = domain.name.as_str();

        if domain.ownership == DnsOwnership::Managed {
            if let Err(e) = self.sync_zone(domain).await {
                log::warn!("[reconcile] Zone sync of {name} failed, continuing: {e}");
            }
        }

        if let Err(e) = self
            .ctx
            .provider_call("trigger_recheck", provider.trigger_recheck(name))
            .await
        {
            log::warn!("[reconcile] Recheck of {name} failed, continuing: {e}");
        }

        let status = self
            .ctx
            .provider_call("get_domain_status", provider.get_domain_status(name))
            .await?;

        let records = self
            .ctx
            .domain_repository
            .list_dns_records(&domain.id)
            .await?;
        let pass = self
            .verification
            .verify_with_provider(
                &domain.name,
                &dkim_selectors(&records),
                ProviderCheck::from(status),
            )
            .await;
        let written = self.verification.persist(domain, &pass).await?;

        if !pass.overall_valid && domain.is_expired_at(Utc::now(), self.ctx.platform.pending_expiry())
        {
            self.ctx
                .domain_repository
                .set_domain_status(&domain.id, DomainStatus::Failed)
                .await?;
            log::info!(
                "[reconcile] {name} not verified after {}h, marked failed",
                self.ctx.platform.pending_expiry_hours
            );
            return Ok(DomainChange::Expired);
        }

        Ok(if written {
            DomainChange::Updated
        } else {
            DomainChange::Unchanged
        })
    }

    /// Refresh the managed zone binding and retry unpublished records.
    async fn sync_zone(&self, domain: &Domain) -> CoreResult<()> {
        let zone_provider = self.ctx.zone_provider()?;
        let repo = &self.ctx.domain_repository;
        let Some(mut binding) = repo.get_zone_binding(&domain.id).await? else {
            log::warn!("[reconcile] Managed domain {} has no zone binding", domain.name);
            return Ok(());
        };

        let zone = self
            .ctx
            .provider_call("get_zone", zone_provider.get_zone(&binding.zone_id))
            .await?;
        if zone.status != binding.sync_status || zone.name_servers != binding.name_servers {
            log::info!(
                "[reconcile] Zone {} is now {}",
                domain.name,
                zone.status.as_str()
            );
            binding.sync_status = zone.status;
            binding.name_servers = zone.name_servers;
            binding.last_synced_at = Utc::now();
            repo.save_zone_binding(&binding).await?;
        }

        if !binding.records_published {
            self.provisioning.publish_zone_records(&domain.id).await?;
        }
        Ok(())
    }
}
