//! Graph command implementation

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use super::utils::{block_on, fetch_context, load_config, RepoSourceArgs};
use crate::domain::GraphDirection;
use crate::graph::{render_mermaid, GraphBuilder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Mermaid flowchart text
    #[default]
    Mermaid,
    /// Grouped nodes and edges as JSON
    Json,
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub source: RepoSourceArgs,

    /// Layout direction (defaults to the configured one, TD)
    #[arg(short, long, value_enum)]
    pub direction: Option<GraphDirection>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = GraphFormat::Mermaid)]
    pub format: GraphFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: GraphArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let context = block_on(fetch_context(&args.source, &config.github))??;

    let mut builder = GraphBuilder::from_config(&config.graph)?;
    if let Some(direction) = args.direction {
        builder = builder.direction(direction);
    }
    let graph = builder.build(&context.repo, &context.entries);

    let rendered = match args.format {
        GraphFormat::Mermaid => render_mermaid(&graph),
        GraphFormat::Json => {
            let mut json = serde_json::to_string_pretty(&graph)?;
            json.push('\n');
            json
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("Failed writing graph to {}", path.display()))?;
            eprintln!("Wrote {} nodes to {}", graph.node_count(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
