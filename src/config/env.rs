//! Environment variable overrides

use crate::domain::Config;
use anyhow::{Context, Result};

/// Apply environment overrides from the process environment.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides read through `lookup`. Empty values are ignored.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(port) = get("PORT") {
        config.server.port =
            port.parse().with_context(|| format!("PORT must be a port number, got '{port}'"))?;
    }
    if let Some(key) = get("OPENAI_API_KEY") {
        config.backend.api_key = Some(key);
    }
    if let Some(base) = get("OPENAI_BASE_URL") {
        config.backend.base_url = base;
    }
    if let Some(token) = get("GITHUB_TOKEN") {
        config.github.token = Some(token);
    }
    if let Some(server) = get("REPO_FLOW_SERVER") {
        config.client.server_url = server;
    }
    Ok(())
}
