//! depshift - Dependency update engine CLI
//!
//! Updates dependencies of Go modules (go.mod, go.sum) and Maven
//! (pom.xml) projects.

use clap::Parser;
use depshift::cli::CliArgs;
use depshift::orchestrator::Orchestrator;
use depshift::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; RUST_LOG wins over --verbose
fn init_tracing(verbose: bool) {
    let default = if verbose { "depshift=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("depshift v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let config = args.load_config()?;
    let show_progress = !(args.quiet || args.json || args.list);
    let orchestrator = Orchestrator::new(&args.path, config, args.build_filter())?
        .with_dry_run(args.dry_run)
        .with_progress(show_progress);

    let output_config =
        OutputConfig::from_cli(args.json, args.diff, args.verbose, args.quiet, args.dry_run);
    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();

    if args.list {
        let (parsed, errors) = orchestrator.parse_all().await;
        formatter.format_dependencies(&parsed, &mut stdout)?;
        stdout.flush()?;
        for error in &errors {
            eprintln!("Error: {}", error);
        }
        return Ok(if errors.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(2)
        });
    }

    let result = orchestrator.run().await;
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if args.json && !result.errors.is_empty() {
        for error in &result.errors {
            eprintln!("Error: {}", error);
        }
    }

    // 2 = partial success, some ecosystems or dependencies failed
    if result.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
