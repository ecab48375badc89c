// # dnsmig-core
//
// Core library for moving DNS A records from one IP address to another
// across every domain of a registrar account.
//
// ## Architecture Overview
//
// - **Registrar**: Trait for listing domains/records and mutating records via a registrar API
// - **MigrationEngine**: Fans out one task per domain, filters matching A records, replaces them
// - **AuditSink**: Single owner of the CSV audit log and the backup snapshot
// - **RunDirectory**: Timestamped output directory for one run
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Registrar API shape is isolated in provider crates
// 2. **Bounded Fan-out**: Domain tasks are capped by a configurable worker count
// 3. **Single Writer**: Workers never touch output files directly; results flow to one collector
// 4. **Library-First**: The CLI is a thin layer over this crate

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod run_dir;
pub mod traits;

// Re-export core types for convenience
pub use audit::{AuditAction, AuditRow, AuditSink, BackupSnapshot};
pub use config::{MigrationConfig, ProviderConfig};
pub use engine::{MigrationEngine, MigrationReport};
pub use error::{Error, Result};
pub use record::{ApiStatus, DnsRecord};
pub use run_dir::RunDirectory;
pub use traits::{Registrar, RegistrarFactory};
