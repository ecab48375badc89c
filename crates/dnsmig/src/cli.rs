use clap::{Args, Parser, Subcommand, ValueEnum};
use dnsmig_core::config::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};
use dnsmig_core::{MigrationConfig, ProviderConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dnsmig",
    about = "Move DNS A records from an old IP to a new IP across every domain of an Internet.bs account",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Internet.bs API key
    #[arg(long, env = "DNSMIG_API_KEY", global = true)]
    pub api_key: Option<String>,

    /// Internet.bs API password
    #[arg(long, env = "DNSMIG_API_PASSWORD", hide_env_values = true, global = true)]
    pub api_pass: Option<String>,

    /// API base URL (e.g. https://testapi.internet.bs for the sandbox)
    #[arg(long, env = "DNSMIG_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Log level
    #[arg(long, env = "DNSMIG_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Registrar configuration from the global options
    ///
    /// Missing credentials become empty strings and are rejected by
    /// [`ProviderConfig::validate`].
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::InternetBs {
            api_key: self.api_key.clone().unwrap_or_default(),
            password: self.api_pass.clone().unwrap_or_default(),
            api_base: self.api_base.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Verbosity of the log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replace A records pointing at the old IP on every domain
    Migrate(MigrateArgs),

    /// Print the account's domains and save them to a file
    ListDomains {
        /// File the domain list is written to
        #[arg(long, default_value = "domains_list.txt")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// Address the A records currently point at, matched verbatim
    /// against record values (no normalization of the dotted quad)
    #[arg(long)]
    pub old_ip: String,

    /// Address the A records should point at
    #[arg(long)]
    pub new_ip: String,

    /// Read and match only; do not remove or add records
    #[arg(long)]
    pub dry_run: bool,

    /// Number of domains processed concurrently
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub threads: usize,

    /// Directory under which the timestamped run directory is created
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
}

impl MigrateArgs {
    pub fn migration_config(&self) -> MigrationConfig {
        MigrationConfig::new(self.old_ip.clone(), self.new_ip.clone())
            .with_dry_run(self.dry_run)
            .with_workers(self.threads)
            .with_log_root(self.log_dir.clone())
    }
}
