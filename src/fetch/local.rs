//! Tree listing of a local git checkout

use crate::domain::{EntryKind, RepoEntry};
use crate::fetch::{FetchError, TreeSource};
use async_trait::async_trait;
use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};
use std::path::Path;

/// Lists the committed `HEAD` tree of a local repository, the same shape the
/// GitHub listing returns for the default branch. Working-tree changes are not
/// included.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTreeSource;

#[async_trait]
impl TreeSource for LocalTreeSource {
    async fn fetch_tree(&self, repo: &str) -> Result<Vec<RepoEntry>, FetchError> {
        let path = repo.to_string();
        tokio::task::spawn_blocking(move || list_head_tree(Path::new(&path)))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))?
    }
}

/// Walk `HEAD` of the repository containing `path`, pre-order.
pub fn list_head_tree(path: &Path) -> Result<Vec<RepoEntry>, FetchError> {
    let repo = Repository::discover(path)
        .map_err(|_| FetchError::NotARepository(path.display().to_string()))?;
    let tree = repo.head()?.peel_to_tree()?;

    let mut entries = Vec::new();
    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        let kind = match entry.kind() {
            Some(ObjectType::Blob) => EntryKind::Blob,
            Some(ObjectType::Tree) => EntryKind::Tree,
            // Submodule commits and anything else are not part of the listing.
            _ => return TreeWalkResult::Skip,
        };
        if let Some(name) = entry.name() {
            entries.push(RepoEntry { path: format!("{root}{name}"), kind });
        }
        TreeWalkResult::Ok
    })?;

    tracing::debug!("Listed {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn commit_all(repo: &Repository) {
        let mut index = repo.index().expect("index");
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None).expect("add");
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = repo.find_tree(tree_id).expect("tree");
        let sig = Signature::now("Test", "test@example.com").expect("sig");
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).expect("commit");
    }

    #[test]
    fn lists_committed_blobs_and_trees() {
        let tmp = TempDir::new().expect("tmp");
        let repo = Repository::init(tmp.path()).expect("init");
        fs::create_dir_all(tmp.path().join("pages/api")).expect("mkdir");
        fs::write(tmp.path().join("pages/api/contact.js"), "export default () => {}\n")
            .expect("write");
        fs::write(tmp.path().join("README.md"), "# Demo\n").expect("write");
        commit_all(&repo);

        let entries = list_head_tree(tmp.path()).expect("list");
        assert!(entries.contains(&RepoEntry::blob("README.md")));
        assert!(entries.contains(&RepoEntry::tree("pages")));
        assert!(entries.contains(&RepoEntry::tree("pages/api")));
        assert!(entries.contains(&RepoEntry::blob("pages/api/contact.js")));
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn rejects_non_repository() {
        let tmp = TempDir::new().expect("tmp");
        let err = list_head_tree(tmp.path()).expect_err("not a repo");
        assert!(matches!(err, FetchError::NotARepository(_)));
    }

    #[tokio::test]
    async fn async_source_delegates_to_walk() {
        let tmp = TempDir::new().expect("tmp");
        let repo = Repository::init(tmp.path()).expect("init");
        fs::write(tmp.path().join("main.rs"), "fn main() {}\n").expect("write");
        commit_all(&repo);

        let entries = LocalTreeSource
            .fetch_tree(tmp.path().to_str().expect("utf8 path"))
            .await
            .expect("list");
        assert_eq!(entries, vec![RepoEntry::blob("main.rs")]);
    }
}
