//! Serve command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::utils::load_config;
use crate::relay::{serve, OpenAiBackend, RelayState};

#[derive(Args)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (env: PORT)
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

pub fn run(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if config.backend.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; every answer will end with an error record");
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener =
            TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {addr}"))?;
        eprintln!("Answer relay listening on http://{addr}/api/analyze");

        let backend = OpenAiBackend::new(reqwest::Client::new(), &config.backend);
        let state = RelayState::new(Arc::new(backend), config.backend.tree_char_limit);
        serve(listener, state).await
    })
}
