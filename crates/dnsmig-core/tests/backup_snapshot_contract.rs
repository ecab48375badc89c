//! Behaviour Contract Test: Backup Snapshot
//!
//! Constraints verified:
//! - Every domain with at least one record is backed up, complete and unfiltered
//! - Domains with no records get no entry and no rows
//! - Two runs against unchanged data produce identical backup files

mod common;

use common::*;
use dnsmig_core::record::DnsRecord;
use dnsmig_core::{AuditSink, MigrationEngine, RunDirectory};
use serde_json::json;
use std::sync::Arc;

fn registrar() -> MockRegistrar {
    MockRegistrar::new()
        .with_domain(
            "a.com",
            vec![
                DnsRecord::new(json!({ "name": "www.a.com", "type": "A", "value": "1.1.1.1", "ttl": 600 })),
                DnsRecord::new(json!({ "name": "a.com", "type": "MX", "value": "mx.a.com", "priority": 10 })),
            ],
        )
        .with_domain("b.com", vec![record("www.b.com", "CNAME", "a.com")])
        .with_domain("empty.com", vec![])
}

#[tokio::test]
async fn backup_holds_full_unfiltered_lists() {
    let registrar = Arc::new(registrar());
    let engine = MigrationEngine::new(registrar.clone(), &config(false, 2)).expect("valid config");
    let (sink, buffer) = memory_sink();

    let (report, summary) = engine.run(sink).await.expect("run succeeds");

    let a = summary.backup.get("a.com").expect("a.com backed up");
    assert_eq!(a.len(), 2);
    // Captured before the mutation: still the old value
    assert_eq!(a[0].value(), "1.1.1.1");
    assert_eq!(a[1].raw()["priority"], 10);

    assert_eq!(summary.backup.get("b.com").map(|r| r.len()), Some(1));
    assert!(!summary.backup.contains("empty.com"));
    assert_eq!(report.domains_empty, 1);

    assert!(buffer.rows().iter().all(|row| row[1] != "empty.com"));
}

#[tokio::test]
async fn repeated_runs_produce_identical_backups() {
    let root = tempfile::tempdir().expect("tempdir");
    let mut rendered = Vec::new();

    for run in 0..2 {
        let registrar = Arc::new(registrar());
        let engine =
            MigrationEngine::new(registrar.clone(), &config(true, 3)).expect("valid config");
        let dir = RunDirectory::create(&root.path().join(format!("run{}", run)))
            .expect("run directory");
        let sink = AuditSink::create(&dir.audit_path()).expect("audit log");

        let (_, summary) = engine.run(sink).await.expect("run succeeds");
        summary.backup.write_to(&dir.backup_path()).expect("backup written");

        rendered.push(std::fs::read_to_string(dir.backup_path()).expect("backup readable"));
    }

    assert_eq!(rendered[0], rendered[1]);
}
