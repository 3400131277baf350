//! petal.toml discovery and command-line overrides

use std::path::Path;

use anyhow::{Context, Result};
use petal_core::PipelineConfig;

const CONFIG_FILE: &str = "petal.toml";

/// Load the pipeline config from `path`, or from `./petal.toml` when it
/// exists, or fall back to defaults. `capacity` overrides the tape capacity.
pub fn load(path: Option<&Path>, capacity: Option<usize>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None if Path::new(CONFIG_FILE).is_file() => PipelineConfig::load(Path::new(CONFIG_FILE))
            .with_context(|| format!("Failed to load {CONFIG_FILE}"))?,
        None => PipelineConfig::default(),
    };

    if let Some(capacity) = capacity {
        config.tape_capacity = capacity;
    }
    config.validate().context("Invalid pipeline configuration")?;
    tracing::debug!(?config, "using pipeline config");
    Ok(config)
}
