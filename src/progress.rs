// src/progress.rs

//! Defines a trait for reporting progress of downloads and extraction.
#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "progress")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "progress")]
use std::sync::Arc;
#[cfg(feature = "progress")]
use std::time::Duration;

/// A trait for reporting progress, abstracting over specific implementations like `indicatif`.
///
/// Implementations must be shareable across the worker threads used by the
/// per-file materializer.
///
/// # Examples
///
/// ```
/// use gitpull::progress::ProgressReporter;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct Counter(AtomicU64);
/// impl ProgressReporter for Counter {
///     fn set_length(&self, _len: u64) {}
///     fn inc(&self, delta: u64) {
///         self.0.fetch_add(delta, Ordering::Relaxed);
///     }
///     fn set_message(&self, _msg: String) {}
///     fn finish_with_message(&self, _msg: String) {}
/// }
///
/// let reporter = Counter(AtomicU64::new(0));
/// reporter.inc(2);
/// assert_eq!(reporter.0.load(Ordering::Relaxed), 2);
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Sets the total number of items to process.
    fn set_length(&self, len: u64);
    /// Advances the current position by `delta` items.
    fn inc(&self, delta: u64);
    /// Sets a descriptive message for the current operation (e.g., "Downloading...").
    fn set_message(&self, msg: String);
    /// Finishes the progress reporting with a final message.
    fn finish_with_message(&self, msg: String);
    /// Removes an unfinished bar from the screen. Called once at the end of every run.
    fn clear(&self) {}
}

/// A `ProgressReporter` that does nothing.
///
/// Used when stderr is not a terminal, and in tests.
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn set_length(&self, _len: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish_with_message(&self, _msg: String) {}
}

/// An implementation of `ProgressReporter` using the `indicatif` crate.
#[cfg(feature = "progress")]
///
/// Nothing is drawn until the first update, so prompts asked before a download
/// starts are left alone.
#[derive(Clone)]
pub struct IndicatifProgress {
    bar: ProgressBar,
    ticking: Arc<AtomicBool>,
}

#[cfg(feature = "progress")]
impl IndicatifProgress {
    /// Creates a bar that counts entries; it spins while the length is still unknown.
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(pb: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:<24} [{bar:30.cyan/blue}] {pos}/{len}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Self {
            bar: pb,
            ticking: Arc::new(AtomicBool::new(false)),
        }
    }

    fn start_ticking(&self) {
        if !self.ticking.swap(true, Ordering::Relaxed) {
            self.bar.enable_steady_tick(Duration::from_millis(120));
        }
    }
}

#[cfg(feature = "progress")]
impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress")]
impl ProgressReporter for IndicatifProgress {
    fn set_length(&self, len: u64) {
        self.bar.set_length(len);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.start_ticking();
        self.bar.set_message(msg);
    }

    fn finish_with_message(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
