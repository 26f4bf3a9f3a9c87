//! Repository context management

use crate::domain::RepoEntry;

/// One analyzed repository snapshot: where it came from and its flat listing.
///
/// Rebuilt wholesale on every fetch; snapshots are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    pub repo: String,
    pub entries: Vec<RepoEntry>,
}

impl RepoContext {
    pub fn new(repo: impl Into<String>, entries: Vec<RepoEntry>) -> Self {
        Self { repo: repo.into(), entries }
    }

    /// Short repository name: the last path segment of the URL or directory.
    pub fn name(&self) -> &str {
        repo_name(&self.repo)
    }
}

/// Last non-empty segment of a repository URL or path, without a `.git`
/// suffix. Falls back to `"repository"`.
pub fn repo_name(repo: &str) -> &str {
    let trimmed = repo.trim().trim_end_matches(['/', '\\']);
    let last = trimmed.rsplit(['/', '\\']).next().unwrap_or("");
    let last = last.strip_suffix(".git").unwrap_or(last);
    if last.is_empty() {
        "repository"
    } else {
        last
    }
}
