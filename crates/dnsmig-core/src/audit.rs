// # Audit & Backup Sink
//
// Single owner of the run's output: the CSV audit log and the in-memory
// backup snapshot.
//
// ## Ownership
//
// ```text
// domain task ─┐
// domain task ─┼── SinkMessage ──▶ collector (blocking thread) ──▶ migration_audit.csv
// domain task ─┘                          │
//                                         └──▶ BackupSnapshot (returned on close)
// ```
//
// Domain tasks only hold an [`AuditHandle`]. Rows are written and flushed
// one at a time as they arrive, so the CSV is usable even if the run is
// interrupted. The snapshot is handed back once every handle is dropped.

use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::record::DnsRecord;

/// Column names of the audit log, in order
pub const AUDIT_HEADER: [&str; 9] = [
    "timestamp",
    "domain",
    "record",
    "old_value",
    "new_value",
    "status",
    "message",
    "duration_ms",
    "action",
];

/// Status written for simulated replacements
pub const DRY_RUN_STATUS: &str = "DRY-RUN";

/// Message written for simulated replacements
pub const DRY_RUN_MESSAGE: &str = "Simulation";

/// What happened to a matched record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditAction {
    /// Remove and add were issued against the registrar
    #[serde(rename = "UPDATE")]
    Update,
    /// Nothing was sent; the replacement was only simulated
    #[serde(rename = "DRY-RUN")]
    DryRun,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Update => write!(f, "UPDATE"),
            AuditAction::DryRun => write!(f, "DRY-RUN"),
        }
    }
}

/// One line of the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRow {
    pub timestamp: String,
    pub domain: String,
    pub record: String,
    pub old_value: String,
    pub new_value: String,
    pub status: String,
    pub message: String,
    pub duration_ms: u64,
    pub action: AuditAction,
}

impl AuditRow {
    /// Timestamp format used in the `timestamp` column
    pub const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Current local time in [`Self::TIMESTAMP_FORMAT`]
    pub fn now_timestamp() -> String {
        Local::now().format(Self::TIMESTAMP_FORMAT).to_string()
    }
}

/// Pre-change copy of every record fetched, keyed by domain
///
/// Keys are kept sorted so that identical server state always serializes to
/// identical bytes, whatever order the domain tasks finished in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BackupSnapshot(BTreeMap<String, Vec<DnsRecord>>);

impl BackupSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the full record list of a domain, replacing any previous entry
    pub fn insert(&mut self, domain: impl Into<String>, records: Vec<DnsRecord>) {
        self.0.insert(domain.into(), records);
    }

    pub fn get(&self, domain: &str) -> Option<&[DnsRecord]> {
        self.0.get(domain).map(Vec::as_slice)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.0.contains_key(domain)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot to `path` as indented JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Messages accepted by the collector
#[derive(Debug)]
pub enum SinkMessage {
    /// Append one audit row
    Row(AuditRow),
    /// Record the pre-change record list of a domain
    Backup {
        domain: String,
        records: Vec<DnsRecord>,
    },
}

/// Cloneable sending side of the sink, handed to every domain task
#[derive(Debug, Clone)]
pub struct AuditHandle {
    tx: mpsc::UnboundedSender<SinkMessage>,
}

impl AuditHandle {
    /// Queue an audit row
    pub fn record_row(&self, row: AuditRow) -> Result<()> {
        self.send(SinkMessage::Row(row))
    }

    /// Queue the backup entry of a domain
    pub fn store_backup(&self, domain: impl Into<String>, records: Vec<DnsRecord>) -> Result<()> {
        self.send(SinkMessage::Backup {
            domain: domain.into(),
            records,
        })
    }

    fn send(&self, message: SinkMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| Error::Other("audit collector has stopped".to_string()))
    }
}

/// What the collector produced once every handle was dropped
#[derive(Debug, Default)]
pub struct SinkSummary {
    /// Accumulated backup snapshot
    pub backup: BackupSnapshot,
    /// Number of audit rows written
    pub rows_written: usize,
}

/// CSV audit log writer
///
/// The header row is written on construction, before any data row.
pub struct AuditSink<W: Write = File> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl AuditSink<File> {
    /// Create (truncate) the audit log at `path` and write its header
    pub fn create(path: &Path) -> Result<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> AuditSink<W> {
    /// Wrap any writer and write the header
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(AUDIT_HEADER)?;
        writer.flush()?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append one row and flush it
    pub fn write_row(&mut self, row: &AuditRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

impl<W: Write + Send + 'static> AuditSink<W> {
    /// Move the sink onto a collector thread
    ///
    /// Returns the handle to clone into domain tasks and the join handle
    /// that yields the [`SinkSummary`] once all handles are dropped.
    /// A row that fails to write is logged and the collector keeps going.
    pub fn spawn(mut self) -> (AuditHandle, JoinHandle<SinkSummary>) {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let join = tokio::task::spawn_blocking(move || {
            let mut backup = BackupSnapshot::new();

            while let Some(message) = rx.blocking_recv() {
                match message {
                    SinkMessage::Row(row) => {
                        if let Err(e) = self.write_row(&row) {
                            tracing::error!(
                                "Failed to write audit row for {} ({}): {}",
                                row.record,
                                row.domain,
                                e
                            );
                        }
                    }
                    SinkMessage::Backup { domain, records } => {
                        backup.insert(domain, records);
                    }
                }
            }

            SinkSummary {
                backup,
                rows_written: self.rows_written,
            }
        });

        (AuditHandle { tx }, join)
    }
}
