//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Environment variables (through clap and the logging layer)
//! - Command-line arguments

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Type catalog used when `--types` is not given
    pub types: Option<PathBuf>,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when neither `-v` nor `RUST_LOG` is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: "compact".to_string(),
        }
    }
}

/// Supported configuration file syntaxes, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSyntax {
    Toml,
    Yaml,
    Json,
}

impl FileSyntax {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::Toml,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    /// Deserialize a document written in this syntax
    pub fn parse<T: serde::de::DeserializeOwned>(self, content: &str) -> Result<T> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = FileSyntax::of(path).parse(&content)?;

        // relative catalog paths are relative to the config file
        if let (Some(types), Some(dir)) = (config.types.as_mut(), path.parent()) {
            if types.is_relative() {
                *types = dir.join(&*types);
            }
        }

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        match Self::default_config_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(&path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check, in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".shapeshift.toml"),
            PathBuf::from(".shapeshift.yaml"),
            PathBuf::from(".shapeshift.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let shapeshift_dir = config_dir.join("shapeshift");
            paths.push(shapeshift_dir.join("config.toml"));
            paths.push(shapeshift_dir.join("config.yaml"));
            paths.push(shapeshift_dir.join("config.json"));
        }

        paths
    }

    /// Reject values that would only fail later
    pub fn validate(&self) -> Result<()> {
        if OutputFormat::from_name(&self.output.format).is_none() {
            return Err(Error::config(format!(
                "unknown output format '{}' (expected human, json, json-pretty or yaml)",
                self.output.format
            )));
        }
        if !matches!(self.logging.format.as_str(), "compact" | "full" | "json") {
            return Err(Error::config(format!(
                "unknown log format '{}' (expected compact, full or json)",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Output format, with the command-line choice taking precedence
    pub fn output_format(&self, cli_choice: Option<OutputFormat>) -> OutputFormat {
        cli_choice
            .or_else(|| OutputFormat::from_name(&self.output.format))
            .unwrap_or(OutputFormat::Human)
    }

    /// Catalog path, with the command-line choice taking precedence
    pub fn types_path<'a>(&'a self, cli_choice: Option<&'a Path>) -> Option<&'a Path> {
        cli_choice.or(self.types.as_deref())
    }
}
