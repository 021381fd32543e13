//! CLI configuration
//!
//! Loaded from a YAML file; every field has a default so an empty file (or
//! no file at all) is valid. Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration for `report-check`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    /// Directory with `<content-path>.schema.json` overrides
    pub schema_dir: Option<PathBuf>,
    /// Concurrent validations in batch mode
    pub max_concurrency: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            schema_dir: None,
            max_concurrency: 8,
        }
    }
}

impl CliConfig {
    /// Read a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&text).map_err(|e| match e {
            Error::Config { message, .. } => Error::Config {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed YAML or unknown keys.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load `path` if given, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`CliConfig::load`] failures.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
