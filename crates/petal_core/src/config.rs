//! Pipeline configuration (petal.toml)

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default tape capacity in records
pub const DEFAULT_TAPE_CAPACITY: usize = 16384;

/// Pipeline configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Records the tape holds before an implicit flush
    #[serde(default = "default_tape_capacity")]
    pub tape_capacity: usize,
    /// Font family hosts use for text records
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Pixel width of the primary surface
    #[serde(default = "default_primary_width")]
    pub primary_width: f32,
    /// Pixel height of the primary surface
    #[serde(default = "default_primary_height")]
    pub primary_height: f32,
}

fn default_tape_capacity() -> usize {
    DEFAULT_TAPE_CAPACITY
}

fn default_font_family() -> String {
    "Ubuntu".to_string()
}

fn default_primary_width() -> f32 {
    800.0
}

fn default_primary_height() -> f32 {
    600.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tape_capacity: default_tape_capacity(),
            font_family: default_font_family(),
            primary_width: default_primary_width(),
            primary_height: default_primary_height(),
        }
    }
}

impl PipelineConfig {
    /// Set the tape capacity
    pub fn with_tape_capacity(mut self, capacity: usize) -> Self {
        self.tape_capacity = capacity;
        self
    }

    /// Set the primary surface size
    pub fn with_primary_size(mut self, width: f32, height: f32) -> Self {
        self.primary_width = width;
        self.primary_height = height;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or from `petal.toml` inside a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join("petal.toml")
        } else {
            path.to_path_buf()
        };
        let content = fs::read_to_string(&config_path)?;
        tracing::debug!(path = %config_path.display(), "loaded pipeline config");
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tape_capacity == 0 {
            return Err(Error::Config("tape_capacity must be at least 1".into()));
        }
        if u32::try_from(self.tape_capacity).is_err() {
            return Err(Error::Config(format!(
                "tape_capacity {} exceeds the 32-bit record count",
                self.tape_capacity
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(Error::Config("font_family must not be empty".into()));
        }
        if !(self.primary_width > 0.0 && self.primary_height > 0.0) {
            return Err(Error::Config(format!(
                "primary surface size {}x{} must be positive",
                self.primary_width, self.primary_height
            )));
        }
        Ok(())
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
