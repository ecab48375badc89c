//! Migration engine
//!
//! The MigrationEngine is responsible for:
//! - Listing the account's domains once, up front
//! - Fanning out one task per domain, bounded by the worker count
//! - Filtering A records that point at the old address
//! - Replacing them (remove, then add) or simulating it in dry-run mode
//! - Reporting one audit row per matched record and one backup entry per domain
//!
//! ## Architecture
//!
//! ```text
//!                     ┌────────────────┐
//!                     │ MigrationEngine│── list_domains (once)
//!                     └────────────────┘
//!                             │  Semaphore(workers)
//!          ┌──────────────────┼──────────────────┐
//!          ▼                  ▼                  ▼
//!   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//!   │ domain task │    │ domain task │    │ domain task │
//!   └─────────────┘    └─────────────┘    └─────────────┘
//!          │ list_records → filter → remove/add │
//!          └──────────────────┬──────────────────┘
//!                             ▼
//!                     ┌────────────────┐
//!                     │   AuditSink    │ (single collector)
//!                     └────────────────┘
//! ```
//!
//! ## Failure Handling
//!
//! Only the upfront domain listing can fail the run. Per-domain failures
//! degrade: an unreadable record list counts as "no records", an unreadable
//! mutation response counts as status `UNKNOWN`. Nothing is retried.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::audit::{
    AuditAction, AuditHandle, AuditRow, AuditSink, DRY_RUN_MESSAGE, DRY_RUN_STATUS, SinkSummary,
};
use crate::config::MigrationConfig;
use crate::error::{Error, Result};
use crate::record::{ApiStatus, DnsRecord};
use crate::traits::Registrar;

/// Record type handled by the migration
const A_RECORD: &str = "A";

/// Outcome of the two-step replacement of one record
///
/// The registrar offers no atomic update, so a replacement is a remove
/// followed by an add, each with its own result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Result of the remove call
    pub removed: ApiStatus,
    /// Result of the add call
    pub added: ApiStatus,
}

impl Replacement {
    /// The old record is gone but the new one was not created
    pub fn is_left_removed(&self) -> bool {
        self.removed.is_success() && !self.added.is_success()
    }
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Domains listed for the account
    pub domains_total: usize,
    /// Domains that returned at least one record
    pub domains_scanned: usize,
    /// Domains that returned no records (or whose listing failed)
    pub domains_empty: usize,
    /// A records pointing at the old address
    pub records_matched: usize,
    /// Replacements whose add call reported success
    pub records_updated: usize,
    /// Replacements whose add call did not report success
    pub records_failed: usize,
    /// Replacements only simulated (dry-run)
    pub records_simulated: usize,
    /// Replacements where remove succeeded and add did not
    pub records_left_removed: usize,
}

impl MigrationReport {
    fn absorb(&mut self, outcome: DomainOutcome) {
        if outcome.scanned {
            self.domains_scanned += 1;
        } else {
            self.domains_empty += 1;
        }
        self.records_matched += outcome.matched;
        self.records_updated += outcome.updated;
        self.records_failed += outcome.failed;
        self.records_simulated += outcome.simulated;
        self.records_left_removed += outcome.left_removed;
    }
}

/// Per-domain counters, merged into the report when a task finishes
#[derive(Debug, Default)]
struct DomainOutcome {
    scanned: bool,
    matched: usize,
    updated: usize,
    failed: usize,
    simulated: usize,
    left_removed: usize,
}

/// Core migration engine
///
/// Cheap to clone: every domain task gets its own copy sharing the same
/// registrar.
///
/// ## Lifecycle
///
/// 1. Create with [`MigrationEngine::new()`]
/// 2. Either call [`MigrationEngine::run()`] with a fresh [`AuditSink`], or
///    drive [`MigrationEngine::list_domains()`] and
///    [`MigrationEngine::migrate()`] yourself
#[derive(Clone)]
pub struct MigrationEngine {
    /// Registrar to read from and write to
    registrar: Arc<dyn Registrar>,

    /// Address being replaced (matched by exact string equality)
    old_ip: Arc<str>,

    /// Replacement address
    new_ip: Arc<str>,

    /// Skip remove/add calls
    dry_run: bool,

    /// Maximum number of domain tasks in flight
    workers: usize,
}

impl std::fmt::Debug for MigrationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEngine")
            .field("registrar", &self.registrar.provider_name())
            .field("old_ip", &self.old_ip)
            .field("new_ip", &self.new_ip)
            .field("dry_run", &self.dry_run)
            .field("workers", &self.workers)
            .finish()
    }
}

impl MigrationEngine {
    /// Create a new engine
    ///
    /// Fails if the configuration does not validate.
    pub fn new(registrar: Arc<dyn Registrar>, config: &MigrationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            registrar,
            old_ip: Arc::from(config.old_ip.as_str()),
            new_ip: Arc::from(config.new_ip.as_str()),
            dry_run: config.dry_run,
            workers: config.workers,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// List the account's domains
    ///
    /// This is the one call whose failure is fatal for a run.
    pub async fn list_domains(&self) -> Result<Vec<String>> {
        let domains = self.registrar.list_domains().await?;
        debug!(
            "{} returned {} domain(s)",
            self.registrar.provider_name(),
            domains.len()
        );
        Ok(domains)
    }

    /// Run a complete migration
    ///
    /// Lists domains, processes them through the worker pool and waits for
    /// the sink to drain. The audit header is already on disk when this is
    /// called, so an account without domains still leaves a header-only log.
    pub async fn run<W>(&self, sink: AuditSink<W>) -> Result<(MigrationReport, SinkSummary)>
    where
        W: Write + Send + 'static,
    {
        let domains = self.list_domains().await?;
        let (audit, collector) = sink.spawn();

        if domains.is_empty() {
            warn!("No domains found for this account");
        } else {
            info!(
                "Found {} domain(s); processing with {} worker(s) [mode: {}]",
                domains.len(),
                self.workers,
                if self.dry_run { "DRY-RUN" } else { "LIVE" }
            );
        }

        let report = self.migrate(domains, &audit).await;
        drop(audit);

        let summary = collector
            .await
            .map_err(|e| Error::Other(format!("audit collector failed: {}", e)))?;

        Ok((report, summary))
    }

    /// Process every domain through the bounded worker pool
    ///
    /// Returns once every domain task has finished. Rows reach the sink in
    /// completion order.
    pub async fn migrate(&self, domains: Vec<String>, audit: &AuditHandle) -> MigrationReport {
        let mut report = MigrationReport {
            domains_total: domains.len(),
            ..MigrationReport::default()
        };

        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for domain in domains {
            // Waiting here keeps at most `workers` domain tasks alive
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Worker pool closed, skipping {}: {}", domain, e);
                    continue;
                }
            };

            let engine = self.clone();
            let audit = audit.clone();
            tasks.spawn(async move {
                let outcome = engine.process_domain(&domain, &audit).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.absorb(outcome),
                Err(e) => {
                    error!("Domain task aborted: {}", e);
                    report.domains_empty += 1;
                }
            }
        }

        info!(
            "Migration finished: {} domain(s), {} matched, {} updated, {} failed, {} simulated",
            report.domains_total,
            report.records_matched,
            report.records_updated,
            report.records_failed,
            report.records_simulated
        );
        if report.records_left_removed > 0 {
            warn!(
                "{} record(s) were removed but not re-added; see the audit log",
                report.records_left_removed
            );
        }

        report
    }

    /// Scan one domain and replace its matching records
    async fn process_domain(&self, domain: &str, audit: &AuditHandle) -> DomainOutcome {
        info!("Scanning domain: {}", domain);
        let mut outcome = DomainOutcome::default();

        let records = match self.registrar.list_records(domain).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to list records for {}: {}", domain, e);
                Vec::new()
            }
        };

        if records.is_empty() {
            warn!("No records found for {}", domain);
            return outcome;
        }
        outcome.scanned = true;

        // Snapshot before any mutation, whether or not something matches
        if let Err(e) = audit.store_backup(domain, records.clone()) {
            error!("Failed to store backup for {}: {}", domain, e);
        }

        for record in records.iter().filter(|r| r.is_a_record_for(&self.old_ip)) {
            outcome.matched += 1;
            let row = self.handle_match(domain, record, &mut outcome).await;

            if let Err(e) = audit.record_row(row) {
                error!(
                    "Failed to queue audit row for {} ({}): {}",
                    record.name(),
                    domain,
                    e
                );
            }
        }

        debug!("Domain {} done: {} match(es)", domain, outcome.matched);
        outcome
    }

    /// Replace (or simulate replacing) one matched record and build its audit row
    async fn handle_match(
        &self,
        domain: &str,
        record: &DnsRecord,
        outcome: &mut DomainOutcome,
    ) -> AuditRow {
        let full_name = record.name();
        info!("{}: {} -> {}", full_name, self.old_ip, self.new_ip);

        let started = Instant::now();
        let (status, action) = if self.dry_run {
            info!(
                "[DRY-RUN] Would replace {} {} {} with {} (ttl {})",
                full_name,
                A_RECORD,
                self.old_ip,
                self.new_ip,
                record.ttl()
            );
            outcome.simulated += 1;
            (
                ApiStatus::new(DRY_RUN_STATUS, DRY_RUN_MESSAGE),
                AuditAction::DryRun,
            )
        } else {
            let replacement = self.replace(record).await;

            if replacement.added.is_success() {
                outcome.updated += 1;
            } else {
                outcome.failed += 1;
                warn!(
                    "Add failed for {}: {} {}",
                    full_name, replacement.added.status, replacement.added.message
                );
            }
            if replacement.is_left_removed() {
                outcome.left_removed += 1;
                warn!(
                    "{} was removed but not re-added; restore it from the backup snapshot",
                    full_name
                );
            }

            (replacement.added, AuditAction::Update)
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        AuditRow {
            timestamp: AuditRow::now_timestamp(),
            domain: domain.to_string(),
            record: full_name.to_string(),
            old_value: self.old_ip.to_string(),
            new_value: self.new_ip.to_string(),
            status: status.status,
            message: status.message,
            duration_ms,
            action,
        }
    }

    /// Remove the old record, then add the new one
    ///
    /// Both calls are always issued; an unreadable response degrades to
    /// status `UNKNOWN`.
    async fn replace(&self, record: &DnsRecord) -> Replacement {
        let full_name = record.name();

        let removed = match self.registrar.remove_record(full_name, A_RECORD).await {
            Ok(status) => status,
            Err(e) => {
                error!("Remove call failed for {}: {}", full_name, e);
                ApiStatus::unknown()
            }
        };
        debug!("Remove {}: {} {}", full_name, removed.status, removed.message);

        let added = match self
            .registrar
            .add_record(full_name, A_RECORD, &self.new_ip, record.ttl())
            .await
        {
            Ok(status) => status,
            Err(e) => {
                error!("Add call failed for {}: {}", full_name, e);
                ApiStatus::unknown()
            }
        };
        debug!("Add {}: {} {}", full_name, added.status, added.message);

        Replacement { removed, added }
    }
}
