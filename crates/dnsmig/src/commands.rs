//! Subcommand implementations
//!
//! Thin glue between the CLI and `dnsmig-core`: create the output files,
//! run the engine, print where things went.

use anyhow::{Context, Result};
use dnsmig_core::{
    AuditSink, MigrationConfig, MigrationEngine, MigrationReport, Registrar, RunDirectory,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Run a full migration and write its audit log and backup
pub async fn cmd_migrate(
    registrar: Arc<dyn Registrar>,
    config: &MigrationConfig,
) -> Result<MigrationReport> {
    let engine = MigrationEngine::new(registrar, config)?;

    let run_dir = RunDirectory::create(&config.log_root)?;
    println!("Logs saved in: {}", run_dir.path().display());

    let audit_path = run_dir.audit_path();
    let sink = AuditSink::create(&audit_path)
        .with_context(|| format!("cannot create audit log {}", audit_path.display()))?;

    let (report, summary) = engine
        .run(sink)
        .await
        .context("cannot list the account's domains")?;

    if report.domains_total == 0 {
        println!("No domains found in the account.");
        return Ok(report);
    }

    let backup_path = run_dir.backup_path();
    summary
        .backup
        .write_to(&backup_path)
        .with_context(|| format!("cannot write backup {}", backup_path.display()))?;
    info!(
        "Backup holds {} domain(s), audit log {} row(s)",
        summary.backup.len(),
        summary.rows_written
    );

    println!("CSV report: {}", audit_path.display());
    println!("Backup JSON: {}", backup_path.display());
    if report.records_left_removed > 0 {
        println!(
            "WARNING: {} record(s) were removed but not re-added. Restore them from the backup.",
            report.records_left_removed
        );
    }
    println!(
        "Done: {} domain(s), {} record(s) matched, {} updated, {} failed{}.",
        report.domains_total,
        report.records_matched,
        report.records_updated,
        report.records_failed,
        if config.dry_run { " (dry run)" } else { "" }
    );

    Ok(report)
}

/// Print the account's domains and save them one per line
///
/// Returns the listed domains.
pub async fn cmd_list_domains(registrar: Arc<dyn Registrar>, output: &Path) -> Result<Vec<String>> {
    let domains = registrar
        .list_domains()
        .await
        .context("cannot list the account's domains")?;

    if domains.is_empty() {
        println!("No domains found for this account.");
        return Ok(domains);
    }

    println!("Found {} registered domains:", domains.len());
    for (i, domain) in domains.iter().enumerate() {
        println!("{}", numbered(i + 1, domain));
    }

    let mut content = domains.join("\n");
    content.push('\n');
    std::fs::write(output, content)
        .with_context(|| format!("cannot write {}", output.display()))?;
    println!("List saved to {}", output.display());

    Ok(domains)
}

fn numbered(position: usize, domain: &str) -> String {
    format!("{:02}. {}", position, domain)
}
