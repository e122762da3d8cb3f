//! Resolver configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! YAML file, environment variables, then command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tianditu::host_root;
use tile_common::{TileError, TileRange, TileResult};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse from string (case-insensitive). Unknown values fall back to text.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// URL the host application is served from; offline tile folders live
    /// under its root.
    pub host_base_url: String,

    pub log_level: String,

    pub log_format: LogFormat,

    /// Largest tile count the `range` command will resolve
    pub max_range_tiles: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            host_base_url: "http://localhost/".to_string(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            max_range_tiles: DEFAULT_MAX_RANGE_TILES,
        }
    }
}

const DEFAULT_MAX_RANGE_TILES: usize = 10_000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ResolverConfig {
    /// Load a YAML file (or defaults), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `TILE_HOST_BASE_URL`, `LOG_LEVEL`, `LOG_FORMAT` and
    /// `TILE_MAX_RANGE_TILES` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TILE_HOST_BASE_URL") {
            self.host_base_url = val;
        }

        if let Some(val) = lookup("LOG_LEVEL") {
            self.log_level = val.to_lowercase();
        }

        if let Some(val) = lookup("LOG_FORMAT") {
            self.log_format = LogFormat::from_str(&val);
        }

        if let Some(val) = lookup("TILE_MAX_RANGE_TILES") {
            if let Ok(max) = val.trim().parse() {
                self.max_range_tiles = max;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> TileResult<()> {
        if self.host_base_url.trim().is_empty() {
            return Err(TileError::Config("host_base_url must not be empty".to_string()));
        }
        host_root(&self.host_base_url)?;

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(TileError::Config(format!(
                "log_level must be one of {}, got {}",
                LOG_LEVELS.join("/"),
                self.log_level
            )));
        }

        if self.max_range_tiles == 0 {
            return Err(TileError::Config(
                "max_range_tiles must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Reject a range holding more tiles than `max_range_tiles`.
    pub fn check_range(&self, range: &TileRange) -> TileResult<()> {
        let tiles = range.len();
        if tiles > self.max_range_tiles {
            return Err(TileError::InvalidBbox(format!(
                "bbox covers {} tiles at level {}, more than the limit of {}",
                tiles, range.level, self.max_range_tiles
            )));
        }
        Ok(())
    }

    /// Root of the host URL, used for offline storage.
    pub fn host_root(&self) -> TileResult<String> {
        host_root(&self.host_base_url)
    }
}
