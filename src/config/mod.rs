//! Configuration loading and merging
//!
//! Precedence: CLI flags > environment > config file > defaults. CLI flags are
//! applied by each subcommand on top of what [`load`] returns.

use crate::domain::Config;
use anyhow::Result;
use std::path::Path;

pub mod env;
pub mod loader;

pub use env::{apply_env_overrides, apply_overrides_from};
pub use loader::load_config;

/// File (explicit or discovered in `dir`) plus environment overrides.
pub fn load(dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let mut config = load_config(dir, config_path)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}
