// src/signal.rs

//! Provides signal handling for graceful shutdown.

use crate::cancellation::CancellationToken;
use anyhow::{Context, Result};

/// Sets up a handler for Ctrl+C (SIGINT).
///
/// The first signal cancels the returned token, letting the running download or
/// extraction stop at its next checkpoint and clean up its temporary archive.
/// A second signal exits immediately with the conventional interrupt status.
///
/// # Errors
/// Returns an error if the signal handler cannot be set.
pub fn setup_signal_handler() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let t = token.clone();

    ctrlc::set_handler(move || {
        if t.cancel() {
            eprintln!("\nAborted.");
            std::process::exit(130);
        }
        log::info!("Ctrl+C signal received, attempting graceful shutdown (press again to exit now).");
    })
    .context("Failed to set Ctrl+C signal handler")?;

    Ok(token)
}
