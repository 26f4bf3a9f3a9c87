//! Command-line interface for repo-flow
//!
//! `graph` renders a repository as a grouped flowchart, `ask` and `chat` query
//! the answer relay, `serve` runs the relay itself.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod ask;
mod chat;
mod completions;
mod graph;
mod serve;
mod utils;

/// Map repositories as flow graphs and chat about them
#[derive(Parser)]
#[command(name = "repo-flow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: repo-flow.toml/.yml in the working directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a repository tree as a grouped flow graph
    Graph(graph::GraphArgs),

    /// Ask one question about a repository and stream the answer
    Ask(ask::AskArgs),

    /// Chat about a repository interactively
    Chat(chat::ChatArgs),

    /// Run the streaming answer relay
    Serve(serve::ServeArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Graph(args) => graph::run(args, config),
        Commands::Ask(args) => ask::run(args, config),
        Commands::Chat(args) => chat::run(args, config),
        Commands::Serve(args) => serve::run(args, config),
        Commands::Completions(args) => completions::run(args),
    }
}
