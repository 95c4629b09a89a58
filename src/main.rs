// src/main.rs

use anyhow::Result;
use clap::Parser;
use gitpull::cli::Cli;
use gitpull::config::ConfigBuilder;
use gitpull::errors::Error;
#[cfg(feature = "progress")]
use gitpull::progress::IndicatifProgress;
use gitpull::progress::ProgressReporter;
use gitpull::signal::setup_signal_handler;
use gitpull::sync::SyncState;
use gitpull::{run, RunOutcome};
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging. Default to 'info' if RUST_LOG is not set.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                if cfg!(debug_assertions) {
                    "gitpull=debug".parse()?
                } else {
                    "gitpull=info".parse()?
                },
            ),
        )
        .init();

    log::debug!("Starting gitpull v{}...", env!("CARGO_PKG_VERSION"));
    log::debug!("Raw arguments: {:?}", std::env::args().collect::<Vec<_>>());

    // --- Setup ---
    let cli = Cli::parse();

    // Decide whether to show a progress bar. Show it if stderr is a TTY.
    let progress_reporter: Option<Arc<dyn ProgressReporter>> = {
        #[cfg(feature = "progress")]
        {
            if atty::is(atty::Stream::Stderr) {
                Some(Arc::new(IndicatifProgress::new()))
            } else {
                None
            }
        }
        #[cfg(not(feature = "progress"))]
        {
            None
        }
    };

    let token = setup_signal_handler()?;

    // --- Configuration & Execution ---
    let result = ConfigBuilder::from_cli(cli).build().and_then(|config| {
        log::debug!("Configuration built successfully: {:?}", config);
        run(&config, &token, progress_reporter)
    });

    // --- Error Handling ---
    match result {
        Ok(outcome) => {
            report(&outcome);
            Ok(())
        }
        Err(e) => {
            let code = e.exit_code();
            match e {
                Error::Aborted => eprintln!("Aborted."),
                Error::Interrupted => eprintln!("\nAborted."),
                Error::InvalidReference { .. }
                | Error::Config(_)
                | Error::NotFound(_)
                | Error::RemoteError { .. }
                | Error::NetworkError(_)
                | Error::MalformedResponse { .. }
                | Error::CorruptArchive(_)
                | Error::EmptyArchive
                | Error::LocalStateError(_)
                | Error::IoError { .. } => eprintln!("Error: {}", e),
            }
            std::process::exit(code);
        }
    }
}

/// Prints the one-line result of a successful run.
fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Initialized {
            reference,
            directory,
        } => println!(
            "Initialized {} for {}",
            directory.display(),
            reference.canonical_url()
        ),
        RunOutcome::Synced(report) => match report.state {
            SyncState::UpToDate => println!(
                "Already up to date ({} at {})",
                report.branch,
                report.short_commit()
            ),
            _ => {
                let files = report.stats.map(|s| s.files_written).unwrap_or_default();
                match report.short_previous() {
                    Some(previous) => println!(
                        "Updated {} ({}): {} -> {}, {} files",
                        report.reference,
                        report.branch,
                        previous,
                        report.short_commit(),
                        files
                    ),
                    None => println!(
                        "Pulled {} ({}) at {}, {} files",
                        report.reference,
                        report.branch,
                        report.short_commit(),
                        files
                    ),
                }
            }
        },
    }
}
