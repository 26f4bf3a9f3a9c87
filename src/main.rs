//! repo-flow: repository flow graphs and a streaming repository chat

use anyhow::Result;

fn main() -> Result<()> {
    repo_flow::cli::run()
}
