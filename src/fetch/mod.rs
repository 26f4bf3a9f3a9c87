//! Repository listing (GitHub API or local git checkout)

use crate::domain::RepoEntry;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub mod context;
pub mod github;
pub mod local;

pub use context::{repo_name, RepoContext};
pub use github::GitHubTreeSource;
pub use local::LocalTreeSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid repository URL: {0}")]
    InvalidUrl(String),

    #[error("Listing service returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Listing service returned no tree data")]
    NoTree,

    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Listing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Listing task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Input errors are reported without having touched the network.
    pub fn is_input_error(&self) -> bool {
        matches!(self, FetchError::InvalidUrl(_) | FetchError::NotARepository(_))
    }
}

/// Supplies the flat `{path, kind}` listing of one repository branch.
#[async_trait]
pub trait TreeSource: Send + Sync {
    async fn fetch_tree(&self, repo: &str) -> Result<Vec<RepoEntry>, FetchError>;
}

/// Fetch a repository listing from a local path or a remote URL.
///
/// - Local path → [`LocalTreeSource`] (committed `HEAD` tree)
/// - URL → the supplied remote source
pub async fn fetch_repository(
    path: Option<&Path>,
    repo_url: Option<&str>,
    remote: &dyn TreeSource,
) -> Result<RepoContext> {
    if let Some(p) = path {
        let p = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
        let display = p.display().to_string();
        let entries = LocalTreeSource.fetch_tree(&display).await?;
        Ok(RepoContext::new(display, entries))
    } else if let Some(url) = repo_url {
        let entries = remote.fetch_tree(url).await?;
        Ok(RepoContext::new(url.trim(), entries))
    } else {
        anyhow::bail!("Either path or repo_url must be specified")
    }
}
