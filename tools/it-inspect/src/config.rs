//! Tool configuration loaded from TOML
//!
//! ```toml
//! [read]
//! max_input_len = 16777216
//! delta_decode_samples = false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use nether_itfile::ReadOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Decoder options
    pub read: ReadOptions,
}

impl InspectConfig {
    /// Load config from file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }
}
