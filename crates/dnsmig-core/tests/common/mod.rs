//! Test doubles and common utilities for migration contract tests
//!
//! The mock registrar serves canned domains and records, counts every call
//! and tracks how many domain listings are in flight at once.

#![allow(dead_code)]

use dnsmig_core::error::{Error, Result};
use dnsmig_core::record::{ApiStatus, DnsRecord};
use dnsmig_core::traits::Registrar;
use dnsmig_core::{AuditSink, MigrationConfig};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// One mutation call seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationCall {
    Remove {
        full_name: String,
        record_type: String,
    },
    Add {
        full_name: String,
        record_type: String,
        value: String,
        ttl: u32,
    },
}

/// A registrar that serves canned data and tracks calls
#[derive(Default)]
pub struct MockRegistrar {
    domains: Vec<String>,
    records: HashMap<String, Vec<DnsRecord>>,
    failing_domains: Vec<String>,
    fail_domain_listing: bool,
    remove_status: Option<ApiStatus>,
    add_status: Option<ApiStatus>,
    fail_add: bool,
    listing_delay: Option<Duration>,
    gates: HashMap<String, Arc<Notify>>,

    list_records_calls: AtomicUsize,
    mutations: Mutex<Vec<MutationCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain with its records
    pub fn with_domain(mut self, domain: &str, records: Vec<DnsRecord>) -> Self {
        self.domains.push(domain.to_string());
        self.records.insert(domain.to_string(), records);
        self
    }

    /// Add a domain whose record listing fails
    pub fn with_failing_domain(mut self, domain: &str) -> Self {
        self.domains.push(domain.to_string());
        self.failing_domains.push(domain.to_string());
        self
    }

    /// Make the domain listing itself fail
    pub fn failing_domain_listing(mut self) -> Self {
        self.fail_domain_listing = true;
        self
    }

    pub fn with_remove_status(mut self, status: ApiStatus) -> Self {
        self.remove_status = Some(status);
        self
    }

    pub fn with_add_status(mut self, status: ApiStatus) -> Self {
        self.add_status = Some(status);
        self
    }

    /// Make every add call fail at transport level
    pub fn failing_add(mut self) -> Self {
        self.fail_add = true;
        self
    }

    /// Hold each record listing for a while so tasks overlap
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    /// Add a domain whose record listing waits until `gate` is notified
    pub fn with_gated_domain(
        mut self,
        domain: &str,
        records: Vec<DnsRecord>,
        gate: Arc<Notify>,
    ) -> Self {
        self.gates.insert(domain.to_string(), gate);
        self.with_domain(domain, records)
    }

    pub fn list_records_calls(&self) -> usize {
        self.list_records_calls.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> Vec<MutationCall> {
        self.mutations.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.lock().unwrap().len()
    }

    /// Highest number of concurrent record listings observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Registrar for MockRegistrar {
    async fn list_domains(&self) -> Result<Vec<String>> {
        if self.fail_domain_listing {
            return Err(Error::http("connection refused"));
        }
        Ok(self.domains.clone())
    }

    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        self.list_records_calls.fetch_add(1, Ordering::SeqCst);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(gate) = self.gates.get(domain) {
            gate.notified().await;
        }

        if self.failing_domains.iter().any(|d| d == domain) {
            return Err(Error::http("operation timed out"));
        }
        Ok(self.records.get(domain).cloned().unwrap_or_default())
    }

    async fn remove_record(&self, full_name: &str, record_type: &str) -> Result<ApiStatus> {
        self.mutations.lock().unwrap().push(MutationCall::Remove {
            full_name: full_name.to_string(),
            record_type: record_type.to_string(),
        });
        Ok(self
            .remove_status
            .clone()
            .unwrap_or_else(|| ApiStatus::new("SUCCESS", "")))
    }

    async fn add_record(
        &self,
        full_name: &str,
        record_type: &str,
        value: &str,
        ttl: u32,
    ) -> Result<ApiStatus> {
        self.mutations.lock().unwrap().push(MutationCall::Add {
            full_name: full_name.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
            ttl,
        });
        if self.fail_add {
            return Err(Error::http("operation timed out"));
        }
        Ok(self
            .add_status
            .clone()
            .unwrap_or_else(|| ApiStatus::new("SUCCESS", "Record added")))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A record as the registrar would return it
pub fn record(name: &str, record_type: &str, value: &str) -> DnsRecord {
    DnsRecord::new(json!({
        "name": name,
        "type": record_type,
        "value": value,
        "ttl": 3600
    }))
}

/// Helper to create the configuration used by most tests
pub fn config(dry_run: bool, workers: usize) -> MigrationConfig {
    MigrationConfig::new("1.1.1.1", "2.2.2.2")
        .with_dry_run(dry_run)
        .with_workers(workers)
}

/// In-memory audit sink writing into a shared buffer
pub fn memory_sink() -> (AuditSink<SharedBuffer>, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let sink = AuditSink::from_writer(buffer.clone()).expect("header write succeeds");
    (sink, buffer)
}

/// Cloneable `Write` target for inspecting the CSV after the sink is gone
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("CSV is UTF-8")
    }

    /// Data lines, header excluded
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.contents()
            .lines()
            .skip(1)
            .map(|line| line.split(',').map(str::to_string).collect())
            .collect()
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
