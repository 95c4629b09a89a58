//! Parses repository references typed by users and remote URLs stored in local config.

use crate::constants::GITHUB_HOST;
use crate::errors::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// An `(owner, name)` pair identifying a hosted repository.
///
/// Neither field is ever empty or contains a `/`; both are otherwise opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    owner: String,
    name: String,
}

impl RepositoryReference {
    /// Creates a reference, rejecting empty segments and segments containing `/`.
    ///
    /// # Examples
    /// ```
    /// use gitpull::github::RepositoryReference;
    ///
    /// let reference = RepositoryReference::new("rust-lang", "cargo").unwrap();
    /// assert_eq!(reference.to_string(), "rust-lang/cargo");
    /// assert!(RepositoryReference::new("rust-lang", "").is_err());
    /// assert!(RepositoryReference::new("a/b", "c").is_err());
    /// ```
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        let valid = |s: &str| !s.is_empty() && !s.contains('/');
        if !valid(&owner) || !valid(&name) {
            return Err(Error::InvalidReference {
                input: format!("{}/{}", owner, name),
            });
        }
        Ok(Self { owner, name })
    }

    /// The account or organisation that owns the repository.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical `https://github.com/<owner>/<name>` form stored in the origin record.
    pub fn canonical_url(&self) -> String {
        format!("https://{}/{}/{}", GITHUB_HOST, self.owner, self.name)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_repo_arg(s)
    }
}

/// Full URL: `http(s)://github.com/owner/name`
static FULL_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)$").expect("valid regex"));

/// Domain-prefixed: `github.com/owner/name`
static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^github\.com/([^/]+)/([^/]+)$").expect("valid regex"));

/// Bare: `owner/name`
static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^/]+)/([^/]+)$").expect("valid regex"));

/// HTTPS remote: `https://github.com/owner/name(.git)?`
static REMOTE_HTTPS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:[^@/]+@)?github\.com/([^/]+)/([^/]+?)(?:\.git)?/?$")
        .expect("valid regex")
});

/// SCP-style SSH remote: `user@github.com:owner/name(.git)?`
static REMOTE_SCP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@/\s]+@github\.com:([^/]+)/([^/]+?)(?:\.git)?$").expect("valid regex")
});

/// URL-style SSH remote: `ssh://user@github.com/owner/name(.git)?`
static REMOTE_SSH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ssh://(?:[^@/]+@)?github\.com(?::\d+)?/([^/]+)/([^/]+?)(?:\.git)?/?$")
        .expect("valid regex")
});

/// Parses a user-supplied repository argument into a [`RepositoryReference`].
///
/// Trailing slashes and a trailing `.git` suffix are removed, then the shapes are
/// tried in order: full URL, domain-prefixed path, bare `owner/name`.
///
/// # Examples
/// ```
/// use gitpull::github::parse_repo_arg;
///
/// for input in [
///     "octocat/hello-world",
///     "github.com/octocat/hello-world",
///     "https://github.com/octocat/hello-world.git/",
/// ] {
///     let reference = parse_repo_arg(input).unwrap();
///     assert_eq!(reference.owner(), "octocat");
///     assert_eq!(reference.name(), "hello-world");
/// }
///
/// assert!(parse_repo_arg("octocat").is_err());
/// assert!(parse_repo_arg("octocat/hello-world/tree/main").is_err());
/// ```
pub fn parse_repo_arg(input: &str) -> Result<RepositoryReference> {
    let trimmed = input.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    [&*FULL_URL_RE, &*DOMAIN_RE, &*BARE_RE]
        .iter()
        .find_map(|re| captures_to_reference(re, trimmed))
        .ok_or_else(|| Error::InvalidReference {
            input: input.to_string(),
        })
}

/// Parses a remote URL as stored in `.git/config` or in the origin record.
///
/// Accepts `https://github.com/owner/name(.git)`, the SCP-like SSH form
/// `git@github.com:owner/name(.git)` and `ssh://git@github.com/owner/name(.git)`.
///
/// # Examples
/// ```
/// use gitpull::github::parse_remote_url;
///
/// let reference = parse_remote_url("git@github.com:rust-lang/cargo.git").unwrap();
/// assert_eq!(reference.to_string(), "rust-lang/cargo");
///
/// let reference = parse_remote_url("https://github.com/rust-lang/cargo").unwrap();
/// assert_eq!(reference.to_string(), "rust-lang/cargo");
///
/// assert!(parse_remote_url("https://gitlab.com/rust-lang/cargo").is_err());
/// ```
pub fn parse_remote_url(url: &str) -> Result<RepositoryReference> {
    let url = url.trim();
    [&*REMOTE_HTTPS_RE, &*REMOTE_SCP_RE, &*REMOTE_SSH_RE]
        .iter()
        .find_map(|re| captures_to_reference(re, url))
        .ok_or_else(|| Error::InvalidReference {
            input: url.to_string(),
        })
}

fn captures_to_reference(re: &Regex, input: &str) -> Option<RepositoryReference> {
    let caps = re.captures(input)?;
    RepositoryReference::new(caps.get(1)?.as_str(), caps.get(2)?.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(r: &RepositoryReference) -> (&str, &str) {
        (r.owner(), r.name())
    }

    #[test]
    fn test_all_accepted_shapes_yield_same_pair() {
        let inputs = [
            "octo/demo",
            "octo/demo/",
            "octo/demo.git",
            "github.com/octo/demo",
            "github.com/octo/demo.git",
            "http://github.com/octo/demo",
            "https://github.com/octo/demo",
            "https://github.com/octo/demo/",
            "https://github.com/octo/demo.git",
            "  https://github.com/octo/demo  ",
        ];
        for input in inputs {
            let parsed = parse_repo_arg(input)
                .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", input, e));
            assert_eq!(pair(&parsed), ("octo", "demo"), "input: {:?}", input);
        }
    }

    #[test]
    fn test_malformed_inputs_are_rejected() {
        let inputs = [
            "",
            "demo",
            "/demo",
            "octo/",
            "octo//demo",
            "octo/demo/extra",
            "https://github.com/octo",
            "https://github.com/octo/demo/tree/main",
            "https://gitlab.com/octo/demo",
            "gitlab.com/octo/demo",
            "octo/.git",
        ];
        for input in inputs {
            match parse_repo_arg(input) {
                Err(Error::InvalidReference { input: reported }) => {
                    assert_eq!(reported, input)
                }
                other => panic!("expected InvalidReference for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_owner_and_name_are_opaque() {
        let parsed = parse_repo_arg("Some.Org_1/repo-with.dots").unwrap();
        assert_eq!(pair(&parsed), ("Some.Org_1", "repo-with.dots"));
    }

    #[test]
    fn test_remote_url_shapes() {
        let inputs = [
            "https://github.com/octo/demo",
            "https://github.com/octo/demo.git",
            "https://github.com/octo/demo/",
            "https://token@github.com/octo/demo.git",
            "git@github.com:octo/demo",
            "git@github.com:octo/demo.git",
            "deploy@github.com:octo/demo.git",
            "ssh://git@github.com/octo/demo.git",
            "ssh://git@github.com:22/octo/demo",
        ];
        for input in inputs {
            let parsed = parse_remote_url(input)
                .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", input, e));
            assert_eq!(pair(&parsed), ("octo", "demo"), "input: {:?}", input);
        }
    }

    #[test]
    fn test_remote_url_rejects_sub_paths_and_other_hosts() {
        for input in [
            "https://github.com/octo/demo/tree/main",
            "git@github.com:octo/demo/extra.git",
            "git@gitlab.com:octo/demo.git",
            "octo/demo",
            "https://github.com/octo",
        ] {
            assert!(
                matches!(parse_remote_url(input), Err(Error::InvalidReference { .. })),
                "expected rejection for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_canonical_url_round_trips_through_both_parsers() {
        let reference = RepositoryReference::new("octo", "demo").unwrap();
        let url = reference.canonical_url();
        assert_eq!(url, "https://github.com/octo/demo");
        assert_eq!(parse_remote_url(&url).unwrap(), reference);
        assert_eq!(parse_repo_arg(&url).unwrap(), reference);
        assert_eq!("octo/demo".parse::<RepositoryReference>().unwrap(), reference);
    }
}
