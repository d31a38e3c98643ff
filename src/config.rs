//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::tree::{Granularity, DEFAULT_GRANULARITIES};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Date-tree configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Granularity sequence for the date tree, coarsest first
    #[serde(default = "default_granularities")]
    pub granularities: Vec<Granularity>,
}

fn default_granularities() -> Vec<Granularity> {
    DEFAULT_GRANULARITIES.to_vec()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            granularities: default_granularities(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("streamdex").join("config.toml")),
            Some(PathBuf::from("/etc/streamdex/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("STREAMDEX_GRANULARITIES") {
            match parse_granularity_list(&raw) {
                Some(granularities) => self.index.granularities = granularities,
                None => tracing::warn!("Ignoring invalid STREAMDEX_GRANULARITIES: {:?}", raw),
            }
        }

        if let Ok(level) = std::env::var("STREAMDEX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("STREAMDEX_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Parse a comma-separated granularity list, e.g. `"year,month,day"`
pub fn parse_granularity_list(raw: &str) -> Option<Vec<Granularity>> {
    let granularities: Vec<Granularity> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Granularity::parse)
        .collect::<Option<Vec<_>>>()?;

    if granularities.is_empty() {
        return None;
    }
    Some(granularities)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}
