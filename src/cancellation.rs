//! Provides a token-based mechanism for graceful cancellation.

use crate::errors::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A token that can be used to signal cancellation to long-running operations.
///
/// This struct is a cloneable, thread-safe wrapper around an `Arc<AtomicBool>`.
/// Downloads and extraction poll it between chunks and entries.
///
/// # Examples
///
/// ```
/// use gitpull::CancellationToken;
/// use std::thread;
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let token_clone = token.clone();
///
/// let handle = thread::spawn(move || {
///     while !token_clone.is_cancelled() {
///         thread::sleep(Duration::from_millis(10));
///     }
/// });
///
/// token.cancel();
/// handle.join().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new `CancellationToken` in a non-cancelled state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)), // false means not cancelled
        }
    }

    /// Signals cancellation.
    ///
    /// Returns `true` if the token had already been cancelled before this call.
    pub fn cancel(&self) -> bool {
        self.inner.swap(true, Ordering::SeqCst)
    }

    /// Checks if the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }

    /// Returns `Err(Error::Interrupted)` once the token has been cancelled.
    ///
    /// ```
    /// use gitpull::CancellationToken;
    /// use gitpull::errors::Error;
    ///
    /// let token = CancellationToken::new();
    /// assert!(token.check().is_ok());
    /// token.cancel();
    /// assert!(matches!(token.check(), Err(Error::Interrupted)));
    /// ```
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
