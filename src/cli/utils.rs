//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{Config, GithubConfig};
use crate::fetch::github::{is_github_repo_url, parse_repo_url};
use crate::fetch::{fetch_repository, GitHubTreeSource, RepoContext};

/// Where the repository listing comes from.
#[derive(Args, Debug, Clone)]
pub struct RepoSourceArgs {
    /// GitHub repository URL (https://github.com/<owner>/<repo>)
    #[arg(short, long, value_name = "URL", conflicts_with = "path", required_unless_present = "path")]
    pub repo: Option<String>,

    /// Local git checkout (lists the committed HEAD tree)
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,
}

/// Load configuration for a subcommand: file from the working directory (or
/// `--config`), then environment.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir().context("Cannot determine working directory")?;
    crate::config::load(&cwd, config_path)
}

/// Validate the source, then fetch its listing behind a spinner.
pub async fn fetch_context(source: &RepoSourceArgs, github: &GithubConfig) -> Result<RepoContext> {
    if let Some(url) = &source.repo {
        let slug = parse_repo_url(url)?;
        if !is_github_repo_url(url) {
            tracing::debug!("Using {}/{} from non-canonical URL {}", slug.owner, slug.repo, url);
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Fetching repository tree...");

    let remote = GitHubTreeSource::from_config(github);
    let result = fetch_repository(source.path.as_deref(), source.repo.as_deref(), &remote).await;
    spinner.finish_and_clear();

    let context = result?;
    tracing::info!("Fetched {} entries from {}", context.entries.len(), context.repo);
    Ok(context)
}

/// Marker printed after live-echoed fragments whose turn then failed.
pub const PARTIAL_DISCARDED: &str = "--- partial answer discarded ---";

/// Terminate a partially echoed answer so the replacement that follows starts
/// on its own line, as it does in the stored history.
pub fn end_partial_echo(streamed: bool) {
    if streamed {
        println!();
        println!("{}", style(PARTIAL_DISCARDED).dim());
    }
}

/// Run `future` to completion on a single-threaded runtime.
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
