//! Configuration types for the migration system
//!
//! This module defines all configuration structures used throughout the workspace.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Default number of domains processed concurrently
pub const DEFAULT_WORKERS: usize = 3;

/// Upper bound for the worker count
pub const MAX_WORKERS: usize = 64;

/// Default per-request timeout against the registrar API (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 40;

/// Default registrar API base URL
pub const DEFAULT_API_BASE: &str = "https://api.internet.bs";

/// Main migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Address that matching A records currently point at
    pub old_ip: String,

    /// Address the matching A records should point at afterwards
    pub new_ip: String,

    /// Perform all reads and matching, skip remove/add calls
    #[serde(default)]
    pub dry_run: bool,

    /// Maximum number of domains processed concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Directory under which the timestamped run directory is created
    #[serde(default = "default_log_root")]
    pub log_root: PathBuf,
}

impl MigrationConfig {
    /// Create a new configuration with defaults
    pub fn new(old_ip: impl Into<String>, new_ip: impl Into<String>) -> Self {
        Self {
            old_ip: old_ip.into(),
            new_ip: new_ip.into(),
            dry_run: false,
            workers: default_workers(),
            log_root: default_log_root(),
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the log root directory
    pub fn with_log_root(mut self, log_root: impl Into<PathBuf>) -> Self {
        self.log_root = log_root.into();
        self
    }

    /// Validate the configuration
    ///
    /// `old_ip` is compared verbatim against record values, so any
    /// non-empty string is accepted (e.g. `192.168.001.010` as the registrar
    /// stored it). `new_ip` is written to the registrar and must be IPv4.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.old_ip.trim().is_empty() {
            return Err(crate::Error::config("old IP cannot be empty"));
        }

        if self.new_ip.parse::<Ipv4Addr>().is_err() {
            return Err(crate::Error::config(format!(
                "new IP '{}' is not a valid IPv4 address",
                self.new_ip
            )));
        }

        if self.old_ip == self.new_ip {
            return Err(crate::Error::config(format!(
                "old IP and new IP are identical ({})",
                self.old_ip
            )));
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(crate::Error::config(format!(
                "worker count must be between 1 and {}. Got: {}",
                MAX_WORKERS, self.workers
            )));
        }

        Ok(())
    }
}

/// Registrar provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Internet.bs reseller API
    InternetBs {
        /// Account API key
        api_key: String,
        /// Account API password
        password: String,
        /// API base URL
        #[serde(default = "default_api_base")]
        api_base: String,
        /// Per-request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

// Hand-written so the password never reaches logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::InternetBs {
                api_key,
                api_base,
                timeout_secs,
                ..
            } => f
                .debug_struct("InternetBs")
                .field("api_key", api_key)
                .field("password", &"<REDACTED>")
                .field("api_base", api_base)
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Internet.bs configuration with the default base URL and timeout
    pub fn internet_bs(api_key: impl Into<String>, password: impl Into<String>) -> Self {
        ProviderConfig::InternetBs {
            api_key: api_key.into(),
            password: password.into(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::InternetBs {
                api_key,
                password,
                api_base,
                timeout_secs,
            } => {
                if api_key.trim().is_empty() {
                    return Err(crate::Error::config("Internet.bs API key cannot be empty"));
                }
                if password.trim().is_empty() {
                    return Err(crate::Error::config(
                        "Internet.bs API password cannot be empty",
                    ));
                }
                if !api_base.starts_with("https://") && !api_base.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "API base URL must use HTTP or HTTPS scheme. Got: {}",
                        api_base
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("API timeout must be > 0"));
                }
                Ok(())
            }
        }
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_log_root() -> PathBuf {
    PathBuf::from("logs")
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
