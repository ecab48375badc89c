//! Behaviour Contract Test: Audit Rows Are Streamed
//!
//! Constraints verified:
//! - A row reaches the audit log as soon as its replacement finishes
//! - A slow domain does not hold back rows of domains already done

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn row_is_written_while_other_domains_are_pending() {
    let gate = Arc::new(Notify::new());
    let registrar = Arc::new(
        MockRegistrar::new()
            .with_domain("a.com", vec![record("www.a.com", "A", "1.1.1.1")])
            .with_gated_domain(
                "b.com",
                vec![record("www.b.com", "A", "1.1.1.1")],
                Arc::clone(&gate),
            ),
    );
    let engine = dnsmig_core::MigrationEngine::new(registrar.clone(), &config(false, 2))
        .expect("valid config");
    let (sink, buffer) = memory_sink();

    let run = tokio::spawn(async move { engine.run(sink).await });

    tokio::time::timeout(Duration::from_secs(5), async {
        while buffer.rows().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("row for a.com written before b.com finished");

    assert!(!run.is_finished(), "Run should still wait on b.com");
    let rows = buffer.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "a.com");

    gate.notify_one();
    let (report, summary) = run
        .await
        .expect("run task joins")
        .expect("run succeeds");

    assert_eq!(report.records_updated, 2);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(buffer.rows().len(), 2);
}
