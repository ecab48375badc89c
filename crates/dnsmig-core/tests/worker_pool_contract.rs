//! Behaviour Contract Test: Bounded Worker Pool
//!
//! Constraints verified:
//! - No more than `workers` domain tasks are in flight at once
//! - Every listed domain is processed exactly once, whatever the worker count
//! - The set of audit rows does not depend on the worker count

mod common;

use common::*;
use dnsmig_core::MigrationEngine;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn account(domains: usize) -> MockRegistrar {
    (0..domains).fold(MockRegistrar::new(), |registrar, i| {
        let domain = format!("d{}.com", i);
        registrar.with_domain(
            &domain,
            vec![
                record(&format!("www.{}", domain), "A", "1.1.1.1"),
                record(&format!("mail.{}", domain), "MX", "mx.example.net"),
            ],
        )
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_count_bounds_in_flight_domains() {
    for workers in [1, 2, 3] {
        let registrar = Arc::new(account(8).with_listing_delay(Duration::from_millis(20)));
        let engine =
            MigrationEngine::new(registrar.clone(), &config(true, workers)).expect("valid config");
        let (sink, _buffer) = memory_sink();

        engine.run(sink).await.expect("run succeeds");

        assert!(
            registrar.max_in_flight() <= workers,
            "Expected at most {} concurrent domains, saw {}",
            workers,
            registrar.max_in_flight()
        );
        assert_eq!(registrar.list_records_calls(), 8);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_rows_for_any_worker_count() {
    let mut baseline: Option<BTreeSet<(String, String)>> = None;

    for workers in 1..=5 {
        let registrar = Arc::new(account(10).with_listing_delay(Duration::from_millis(2)));
        let engine =
            MigrationEngine::new(registrar.clone(), &config(false, workers)).expect("valid config");
        let (sink, buffer) = memory_sink();

        let (report, summary) = engine.run(sink).await.expect("run succeeds");

        assert_eq!(report.domains_total, 10);
        assert_eq!(report.domains_scanned, 10);
        assert_eq!(summary.backup.len(), 10);

        let rows: BTreeSet<(String, String)> = buffer
            .rows()
            .into_iter()
            .map(|r| (r[1].clone(), r[2].clone()))
            .collect();
        assert_eq!(rows.len(), 10);

        match &baseline {
            Some(expected) => assert_eq!(&rows, expected, "workers={} changed the row set", workers),
            None => baseline = Some(rows),
        }
    }
}
