//! The `gitpull` prelude for convenient library usage.
//!
//! This module re-exports the most commonly used types, traits, and functions
//! from the `gitpull` library.
//!
//! # Example
//!
//! ```
//! use gitpull::prelude::*;
//! # fn main() -> Result<()> {
//!
//! let reference = parse_repo_arg("github.com/octo/demo")?;
//! assert_eq!(reference.canonical_url(), "https://github.com/octo/demo");
//!
//! let store = MemoryStateStore::new();
//! store.write_origin(&reference.canonical_url())?;
//! assert_eq!(assess(store.read_last_commit()?.as_deref(), "abc"), SyncState::Uninitialized);
//!
//! # Ok(())
//! # }
//! ```

pub use crate::cancellation::CancellationToken;
pub use crate::config::{Config, ConfigBuilder, GitHubConfig, Mode};
pub use crate::errors::{Error, Result};
pub use crate::github::{
    parse_remote_url, parse_repo_arg, GitHubClient, MockRemote, Remote, RemoteFileEntry,
    RepositoryReference,
};
pub use crate::materialize::{extract_archive, materialize_files, MaterializeStats, TransferMethod};
pub use crate::progress::{NoOpProgress, ProgressReporter};
pub use crate::prompt::{Prompter, TerminalPrompter};
pub use crate::state::{FsStateStore, MemoryStateStore, StateStore};
pub use crate::sync::{assess, SyncReport, SyncRequest, SyncState, Syncer};
pub use crate::{execute, run, RunOutcome};
