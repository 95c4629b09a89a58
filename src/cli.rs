// src/cli.rs

use clap::Parser;

/// Mirror the latest state of a GitHub repository over plain HTTPS.
///
/// gitpull downloads a branch snapshot (as a zip archive, or file by file with
/// --fallback) and writes it into a local directory, recording the origin in
/// `.gitpull` and the pulled commit in `.gitpull.version`. Running it again only
/// downloads when the branch has moved. No git protocol traffic is involved.
///
/// Without REPO, the current directory (or --dir) is updated from the repository
/// named in its `.gitpull` file, or from the origin remote of its `.git` checkout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Repository to clone into <DIR>/<name>: owner/repo, github.com/owner/repo or a full URL.
    #[arg(value_name = "REPO", conflicts_with = "init")]
    pub repo: Option<String>,

    /// Branch to pull instead of the default. Use '?' to choose from a menu.
    #[arg(short = 'b', long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Fetch files one by one through the trees/blobs API instead of a zip archive.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub fallback: bool,

    /// Record REPO as the origin of the directory without downloading anything.
    #[arg(long, value_name = "REPO", conflicts_with_all = ["branch", "fallback"])]
    pub init: Option<String>,

    /// Directory to work in.
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub dir: String,
}
