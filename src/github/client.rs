//! Talks to the GitHub REST API and archive endpoint with a blocking `reqwest` client.

use super::api::{decode_blob, malformed, snapshot_files, Remote, RemoteFileEntry, TreeItem};
use super::url::RepositoryReference;
use crate::config::GitHubConfig;
use crate::constants::{ARCHIVE_TIMEOUT, BRANCHES_PER_PAGE, METADATA_TIMEOUT, TREE_TIMEOUT};
use crate::errors::{Error, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;
use url::Url;

/// Represents the repository metadata from the GitHub API, only for getting the default branch.
#[derive(Deserialize, Debug)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Deserialize, Debug)]
struct BranchItem {
    name: String,
}

#[derive(Deserialize, Debug)]
struct CommitInfo {
    sha: String,
}

#[derive(Deserialize, Debug)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize, Debug)]
struct BlobResponse {
    #[serde(default)]
    content: String,
    #[serde(default = "default_blob_encoding")]
    encoding: String,
}

fn default_blob_encoding() -> String {
    "base64".to_string()
}

/// A [`Remote`] backed by the GitHub REST API.
///
/// To access private repositories or avoid API rate limits, set a `GITHUB_TOKEN`
/// environment variable with a Personal Access Token that has `repo` scope.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: Url,
    web_url: Url,
}

impl GitHubClient {
    /// Builds a client with default headers for GitHub API interaction.
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| {
                Error::Config(crate::errors::ConfigError::InvalidValue {
                    option: "user agent".to_string(),
                    reason: e.to_string(),
                })
            })?,
        );

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                Error::Config(crate::errors::ConfigError::InvalidValue {
                    option: crate::constants::TOKEN_ENV.to_string(),
                    reason: "contains characters not allowed in an HTTP header".to_string(),
                })
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
            log::debug!("Using GITHUB_TOKEN for authentication.");
        }

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::NetworkError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            web_url: config.web_url.clone(),
        })
    }

    /// `<api>/repos/<owner>/<name>/<rest...>`
    fn repo_url(&self, repo: &RepositoryReference, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["repos", repo.owner(), repo.name()];
        segments.extend_from_slice(rest);
        join_segments(&self.api_url, &segments)
    }

    fn get(&self, url: Url, timeout: Duration, what: &str) -> Result<Response> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(transport_error)?;
        check_status(response, what)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, timeout: Duration, what: &str) -> Result<T> {
        let response = self.get(url.clone(), timeout, what)?;
        response.json::<T>().map_err(|e| {
            if e.is_decode() {
                malformed(&url, e)
            } else {
                transport_error(e)
            }
        })
    }
}

impl Remote for GitHubClient {
    fn default_branch(&self, repo: &RepositoryReference) -> Result<String> {
        let url = self.repo_url(repo, &[])?;
        log::debug!("Fetching repo metadata from: {}", url);
        let info: RepoInfo =
            self.get_json(url, METADATA_TIMEOUT, &format!("Repository {}", repo))?;
        Ok(info.default_branch)
    }

    fn branch_page(&self, repo: &RepositoryReference, page: u32) -> Result<Vec<String>> {
        let mut url = self.repo_url(repo, &["branches"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &BRANCHES_PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        let items: Vec<BranchItem> =
            self.get_json(url, METADATA_TIMEOUT, &format!("Repository {}", repo))?;
        Ok(items.into_iter().map(|b| b.name).collect())
    }

    fn latest_commit(&self, repo: &RepositoryReference, branch: &str) -> Result<String> {
        let mut rest = vec!["commits"];
        rest.extend(branch.split('/'));
        let url = self.repo_url(repo, &rest)?;
        let commit: CommitInfo = self.get_json(
            url,
            METADATA_TIMEOUT,
            &format!("Branch {} in {}", branch, repo),
        )?;
        Ok(commit.sha)
    }

    fn open_archive(
        &self,
        repo: &RepositoryReference,
        branch: &str,
    ) -> Result<Box<dyn Read + Send>> {
        let url = archive_url(&self.web_url, repo, branch)?;
        log::debug!("Downloading archive from: {}", url);
        let response = self.get(url, ARCHIVE_TIMEOUT, &format!("Branch {} in {}", branch, repo))?;
        Ok(Box::new(response))
    }

    fn file_tree(&self, repo: &RepositoryReference, branch: &str) -> Result<Vec<RemoteFileEntry>> {
        let mut rest = vec!["git", "trees"];
        rest.extend(branch.split('/'));
        let mut url = self.repo_url(repo, &rest)?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let listing: TreeResponse = self.get_json(
            url,
            TREE_TIMEOUT,
            &format!("Repository or branch {}@{}", repo, branch),
        )?;
        if listing.truncated {
            log::warn!(
                "The tree listing for {}@{} was truncated by the API; some files will be missing.",
                repo,
                branch
            );
        }
        Ok(snapshot_files(listing.tree))
    }

    fn blob(&self, repo: &RepositoryReference, content_id: &str) -> Result<Vec<u8>> {
        let url = self.repo_url(repo, &["git", "blobs", content_id])?;
        let blob: BlobResponse =
            self.get_json(url.clone(), TREE_TIMEOUT, &format!("Blob {}", content_id))?;
        decode_blob(&blob.content, &blob.encoding).map_err(|reason| malformed(&url, reason))
    }
}

/// `<web>/<owner>/<name>/archive/refs/heads/<branch>.zip`
pub(crate) fn archive_url(web_url: &Url, repo: &RepositoryReference, branch: &str) -> Result<Url> {
    let mut segments: Vec<String> = vec![
        repo.owner().to_string(),
        repo.name().to_string(),
        "archive".to_string(),
        "refs".to_string(),
        "heads".to_string(),
    ];
    let mut parts: Vec<&str> = branch.split('/').collect();
    let last = parts.pop().unwrap_or_default();
    segments.extend(parts.into_iter().map(str::to_string));
    segments.push(format!("{}.zip", last));
    let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
    join_segments(web_url, &refs)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| malformed(base, "base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Classifies a response status: 404 is `NotFound`, other non-2xx is `RemoteError`.
pub(crate) fn classify_status(status: StatusCode, what: &str) -> Option<Error> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND {
        Some(Error::NotFound(what.to_string()))
    } else {
        Some(Error::RemoteError {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        })
    }
}

fn check_status(response: Response, what: &str) -> Result<Response> {
    match classify_status(response.status(), what) {
        None => Ok(response),
        Some(err) => {
            log::debug!("Request for {} failed with {}", what, response.status());
            Err(err)
        }
    }
}

/// A failure before any response arrived.
fn transport_error(e: reqwest::Error) -> Error {
    Error::NetworkError(e.to_string())
}
