//! GitHub tree listing through the REST API

use crate::domain::{EntryKind, GithubConfig, RepoEntry};
use crate::fetch::{FetchError, TreeSource};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use url::Url;

static GITHUB_REPO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?github\.com/[\w-]+/[\w.-]+/?$").expect("valid regex")
});

/// Returns `true` if `url` is exactly a `https://github.com/<owner>/<repo>` URL.
pub fn is_github_repo_url(url: &str) -> bool {
    GITHUB_REPO_URL.is_match(url.trim())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

/// Extract `owner/repo` from a repository URL.
///
/// Only the first two path segments are used, so deep links such as
/// `.../tree/main/src` resolve to the repository itself.
pub fn parse_repo_url(repo_url: &str) -> Result<RepoSlug, FetchError> {
    let invalid = || FetchError::InvalidUrl(repo_url.to_string());
    let url = Url::parse(repo_url.trim()).map_err(|_| invalid())?;
    let mut segments = url.path_segments().ok_or_else(invalid)?.filter(|s| !s.is_empty());
    let owner = segments.next().ok_or_else(invalid)?;
    let repo = segments.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(invalid());
    }
    Ok(RepoSlug { owner: owner.to_string(), repo: repo.to_string() })
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Option<Vec<TreeItem>>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeItem {
    path: Option<String>,
    #[serde(rename = "type")]
    kind: String,
}

/// Listing-service client. Construct one per session and pass it to callers.
#[derive(Debug, Clone)]
pub struct GitHubTreeSource {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubTreeSource {
    pub fn new(client: reqwest::Client, api_base: &str, token: Option<String>) -> Self {
        Self { client, api_base: api_base.trim_end_matches('/').to_string(), token }
    }

    pub fn from_config(config: &GithubConfig) -> Self {
        Self::new(reqwest::Client::new(), &config.api_base, config.token.clone())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("repo-flow/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TreeSource for GitHubTreeSource {
    async fn fetch_tree(&self, repo_url: &str) -> Result<Vec<RepoEntry>, FetchError> {
        let slug = parse_repo_url(repo_url)?;
        let base = format!("{}/repos/{}/{}", self.api_base, slug.owner, slug.repo);

        let info: RepoInfo = self.get_json(&base).await?;
        tracing::debug!("Default branch of {}/{}: {}", slug.owner, slug.repo, info.default_branch);

        let tree_url = format!("{base}/git/trees/{}?recursive=true", info.default_branch);
        let listing: TreeResponse = self.get_json(&tree_url).await?;
        if listing.truncated {
            tracing::warn!("GitHub truncated the tree listing for {}/{}", slug.owner, slug.repo);
        }

        let items = listing.tree.ok_or(FetchError::NoTree)?;
        Ok(items.into_iter().filter_map(into_entry).collect())
    }
}

fn into_entry(item: TreeItem) -> Option<RepoEntry> {
    let kind = match item.kind.as_str() {
        "blob" => EntryKind::Blob,
        "tree" => EntryKind::Tree,
        _ => return None,
    };
    Some(RepoEntry { path: item.path?, kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_repo_url_extracts_owner_and_repo() {
        let slug = parse_repo_url("https://github.com/acme/site").expect("valid");
        assert_eq!(slug, RepoSlug { owner: "acme".into(), repo: "site".into() });

        let slug = parse_repo_url("https://github.com/acme/site.git/").expect("valid");
        assert_eq!(slug.repo, "site");

        let slug = parse_repo_url("https://github.com/acme/site/tree/main/src").expect("valid");
        assert_eq!(slug.repo, "site");
    }

    #[test]
    fn parse_repo_url_rejects_missing_repo() {
        assert!(matches!(
            parse_repo_url("https://github.com/acme"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(parse_repo_url("not a url"), Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn github_repo_url_validation() {
        assert!(is_github_repo_url("https://github.com/acme/site"));
        assert!(is_github_repo_url("https://www.github.com/acme/my.site/"));
        assert!(!is_github_repo_url("https://gitlab.com/acme/site"));
        assert!(!is_github_repo_url("https://github.com/acme"));
        assert!(!is_github_repo_url("https://github.com/acme/site/tree/main"));
    }

    #[test]
    fn tree_items_keep_only_blobs_and_trees() {
        let json = r#"{"tree":[
            {"path":"src","type":"tree"},
            {"path":"src/main.rs","type":"blob"},
            {"path":"vendor/lib","type":"commit"},
            {"type":"blob"}
        ],"truncated":false}"#;
        let listing: TreeResponse = serde_json::from_str(json).expect("parse");
        let entries: Vec<RepoEntry> =
            listing.tree.expect("tree").into_iter().filter_map(into_entry).collect();
        assert_eq!(entries, vec![RepoEntry::tree("src"), RepoEntry::blob("src/main.rs")]);
    }

    #[tokio::test]
    async fn fetch_tree_rejects_bad_url_before_network() {
        // Unroutable API base: reaching the network would surface as Http, not InvalidUrl.
        let source = GitHubTreeSource::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
        let err = source.fetch_tree("https://github.com/").await.expect_err("must fail");
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
