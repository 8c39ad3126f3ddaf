use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use policies_mapping::{HttpVaultClient, Reconciler};

/// Reconcile auth backend policy mappings against a Vault instance.
#[derive(Parser, Debug)]
#[command(name = "policies-mapping", version, about)]
struct Args {
    /// Path to the YAML policies mapping
    #[arg(short = 'f', long = "file", env = "POLICIES_MAPPING_FILE")]
    file: PathBuf,

    /// Report the changes without applying them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "policies mapping failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = fs::read(&args.file)
        .map_err(|e| format!("failed to read {}: {e}", args.file.display()))?;

    let client = HttpVaultClient::from_env()?;
    let report = Reconciler::new(client).apply(&config, args.dry_run)?;

    if report.is_noop() {
        info!(dry_run = report.dry_run, "policies mapping already up to date");
        return Ok(());
    }

    info!(
        dry_run = report.dry_run,
        written = report.to_write.len(),
        deleted = report.removed().count(),
        discover_ms = report.phases.discover.as_millis() as u64,
        apply_ms = report.phases.apply.as_millis() as u64,
        "policies mapping reconciled"
    );
    Ok(())
}
