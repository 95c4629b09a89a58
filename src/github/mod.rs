//! Everything that talks to, or names things on, the hosting forge.

mod api;
mod client;
mod mock;
mod url;

pub use api::{BranchPages, Remote, RemoteFileEntry};
pub use client::GitHubClient;
pub use mock::{MockFailure, MockOp, MockRemote};
pub use self::url::{parse_remote_url, parse_repo_arg, RepositoryReference};
