//! Defines application-specific error types.
//!
//! Every component returns the closed [`Error`] enumeration below. The binary
//! matches on it exhaustively to choose a user-facing message and an exit status,
//! so callers can distinguish "repository does not exist" from "network is down"
//! without inspecting strings.

use thiserror::Error;

/// A specialized `Result` type for `gitpull` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-specific errors used throughout `gitpull`.
#[derive(Error, Debug)]
pub enum Error {
    // --- Input Errors ---
    /// The repository reference did not match any accepted shape.
    #[error("Could not parse repository: {input}\nExpected format: owner/repo, github.com/owner/repo, or https://github.com/owner/repo")]
    InvalidReference {
        /// The input exactly as it was given.
        input: String,
    },

    /// Invalid configuration settings or option combinations.
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- Remote Errors ---
    /// The repository or branch does not exist, or is not visible to us (HTTP 404).
    #[error("{0} not found (or is private)")]
    NotFound(String),

    /// The remote answered with a non-success status other than 404.
    #[error("GitHub API error: {status} {reason}")]
    RemoteError {
        /// The HTTP status code.
        status: u16,
        /// The canonical reason phrase for the status.
        reason: String,
    },

    /// The request never produced a response (DNS, timeout, connection reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The remote answered successfully but the payload could not be understood.
    #[error("Unexpected response from {url}: {reason}")]
    MalformedResponse {
        /// The URL that produced the payload.
        url: String,
        /// What was wrong with it.
        reason: String,
    },

    // --- Archive Errors ---
    /// The downloaded archive could not be parsed or read.
    #[error("Downloaded archive is corrupt: {0}")]
    CorruptArchive(String),

    /// The downloaded archive contains no entries.
    #[error("Empty zip archive")]
    EmptyArchive,

    // --- Local Errors ---
    /// The target directory is not in a state this operation can work with.
    #[error("{0}")]
    LocalStateError(String),

    /// Error occurring during file or directory access (read, write, metadata).
    #[error("I/O error accessing path '{path}': {source}")]
    IoError {
        /// The path that caused the I/O error.
        path: String,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    // --- Control Flow ---
    /// The user declined to choose a branch.
    #[error("Aborted.")]
    Aborted,

    /// The operation was cancelled by the user (e.g., Ctrl+C).
    #[error("Operation cancelled by user (Ctrl+C)")]
    Interrupted,
}

/// Errors raised while building a [`Config`](crate::config::Config).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two options were given that cannot be used together.
    #[error("Invalid configuration: Cannot use {option1} and {option2} simultaneously.")]
    Conflict { option1: String, option2: String },

    /// An option was given a value it cannot accept.
    #[error("Invalid configuration: Invalid value for {option}: {reason}")]
    InvalidValue { option: String, reason: String },
}

impl Error {
    /// The process exit status the binary uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidReference { .. } | Error::Config(_) => 2,
            Error::NotFound(_) => 3,
            Error::RemoteError { .. } | Error::MalformedResponse { .. } => 4,
            Error::NetworkError(_) => 5,
            Error::CorruptArchive(_) | Error::EmptyArchive => 6,
            Error::LocalStateError(_) => 7,
            Error::IoError { .. } => 1,
            Error::Aborted => 0,
            Error::Interrupted => 130,
        }
    }

    /// Whether this error came from talking to the remote rather than from local state.
    pub fn is_transfer_failure(&self) -> bool {
        matches!(
            self,
            Error::RemoteError { .. } | Error::NetworkError(_) | Error::NotFound(_)
        )
    }
}

/// Helper function to create an `Error::IoError` with path context.
///
/// # Arguments
/// * `source` - The original `std::io::Error`.
/// * `path` - The path associated with the error, convertible to `AsRef<std::path::Path>`.
pub fn io_error_with_path<P: AsRef<std::path::Path>>(source: std::io::Error, path: P) -> Error {
    Error::IoError {
        path: path.as_ref().display().to_string(),
        source,
    }
}
