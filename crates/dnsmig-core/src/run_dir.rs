//! Timestamped output directory for one migration run
//!
//! Layout:
//!
//! ```text
//! <log_root>/<YYYYmmdd_HHMMSS>_massupdate/
//! ├── migration_audit.csv
//! └── backup_records.json
//! ```

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the CSV audit log
pub const AUDIT_FILE_NAME: &str = "migration_audit.csv";

/// File name of the JSON backup snapshot
pub const BACKUP_FILE_NAME: &str = "backup_records.json";

const DIR_SUFFIX: &str = "massupdate";

/// Output directory of a single run
#[derive(Debug, Clone)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    /// Create the run directory for the current local time
    pub fn create(log_root: &Path) -> Result<Self> {
        Self::create_at(log_root, Local::now())
    }

    /// Create the run directory for a given start time
    pub fn create_at(log_root: &Path, started: DateTime<Local>) -> Result<Self> {
        let name = format!("{}_{}", started.format("%Y%m%d_%H%M%S"), DIR_SUFFIX);
        let path = log_root.join(name);

        std::fs::create_dir_all(&path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create run directory {}: {}", path.display(), e),
            ))
        })?;

        tracing::debug!("Run directory ready: {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn audit_path(&self) -> PathBuf {
        self.path.join(AUDIT_FILE_NAME)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.path.join(BACKUP_FILE_NAME)
    }
}
