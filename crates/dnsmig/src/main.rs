// # dnsmig - registrar-wide A record migration
//
// Thin command-line layer over dnsmig-core:
// 1. Parse options (flags or DNSMIG_* environment variables)
// 2. Validate configuration before any network call
// 3. Build the registrar client and the runtime
// 4. Dispatch the subcommand
//
// ## Example
//
// ```bash
// export DNSMIG_API_KEY=your_key
// export DNSMIG_API_PASSWORD=your_password
//
// dnsmig migrate --old-ip 203.0.113.10 --new-ip 198.51.100.20 --dry-run
// dnsmig list-domains --output domains_list.txt
// ```

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use dnsmig_core::{ProviderConfig, Registrar, RegistrarFactory};
use dnsmig_provider_internetbs::InternetBsFactory;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (individual record failures are in the audit log)
/// - 1: Invalid options or configuration
/// - 2: Failure while running (domain listing, output files)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsmigExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DnsmigExitCode> for ExitCode {
    fn from(code: DnsmigExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// `--help` and `--version` exit cleanly; real parse errors are config errors
fn parse_error_code(e: &clap::Error) -> DnsmigExitCode {
    if e.use_stderr() {
        DnsmigExitCode::ConfigError
    } else {
        DnsmigExitCode::CleanShutdown
    }
}

/// Check everything that can be checked before touching the network
fn validate_config(cli: &Cli) -> dnsmig_core::Result<ProviderConfig> {
    let provider_config = cli.provider_config();
    provider_config.validate()?;

    if let Command::Migrate(args) = &cli.command {
        args.migration_config().validate()?;
    }

    Ok(provider_config)
}

/// Per-record failures never reach here; anything that does is fatal
fn run_outcome_code(result: &anyhow::Result<()>) -> DnsmigExitCode {
    match result {
        Ok(()) => DnsmigExitCode::CleanShutdown,
        Err(_) => DnsmigExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return parse_error_code(&e).into();
        }
    };

    let provider_config = match validate_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return DnsmigExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsmigExitCode::ConfigError.into();
    }

    let registrar: Arc<dyn Registrar> = match InternetBsFactory.create(&provider_config) {
        Ok(registrar) => Arc::from(registrar),
        Err(e) => {
            error!("Failed to create registrar client: {}", e);
            return DnsmigExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsmigExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Command::Migrate(args) => {
                let config = args.migration_config();
                info!(
                    "Migrating A records {} -> {} with {} worker(s){}",
                    config.old_ip,
                    config.new_ip,
                    config.workers,
                    if config.dry_run { " [dry run]" } else { "" }
                );
                commands::cmd_migrate(registrar, &config).await.map(|_| ())
            }
            Command::ListDomains { output } => commands::cmd_list_domains(registrar, &output)
                .await
                .map(|_| ()),
        }
    });

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    run_outcome_code(&result).into()
}
