// src/constants.rs

use std::time::Duration;

/// The forge domain repository references are resolved against.
pub const GITHUB_HOST: &str = "github.com";

/// Default base URL of the GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default base URL that serves branch archives.
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// Environment variable overriding [`DEFAULT_API_URL`].
pub const API_URL_ENV: &str = "GITPULL_API_URL";

/// Environment variable overriding [`DEFAULT_WEB_URL`].
pub const WEB_URL_ENV: &str = "GITPULL_WEB_URL";

/// Environment variable holding an optional personal access token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// File at the target root recording the origin URL.
pub const ORIGIN_FILE: &str = ".gitpull";

/// File at the target root recording the last synced commit.
pub const VERSION_FILE: &str = ".gitpull.version";

/// Version-control metadata folder that is never materialized.
pub const VCS_DIR: &str = ".git";

/// Page size requested when listing branches (the API maximum).
pub const BRANCHES_PER_PAGE: usize = 100;

/// Number of characters shown for an abbreviated commit.
pub const SHORT_SHA_LEN: usize = 7;

/// Timeout for small metadata requests (repository, branches, commit).
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for tree listings and individual blobs.
pub const TREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for downloading a whole branch archive.
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(120);

/// Chunk size used while streaming an archive to temporary storage.
pub const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;
