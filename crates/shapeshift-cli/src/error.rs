//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from shapeshift-core library
    #[error(transparent)]
    Core(#[from] shapeshift_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format ({})", path.display(), expected, message)]
    InvalidFormat {
        path: PathBuf,
        expected: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) => 14,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(
            self,
            Self::Core(shapeshift_core::Error::ConverterNotFound { .. })
        )
    }
}

/// Format an error for display to the user
///
/// Core conversion failures are printed with their full cause chain, one
/// cause per line.
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    if let Error::Core(core) = error {
        let mut cause = std::error::Error::source(core);
        while let Some(current) = cause {
            if use_color {
                use colored::Colorize;
                message.push_str(&format!("\n  {} {}", "caused by:".yellow(), current));
            } else {
                message.push_str(&format!("\n  caused by: {}", current));
            }
            cause = current.source();
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapeshift_core::{default_registry, TypeDescriptor, Value};

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::config("bad").exit_code(), 5);
        assert_eq!(Error::other("x").exit_code(), 99);
        assert_eq!(
            Error::FileNotFound {
                path: PathBuf::from("missing.json")
            }
            .exit_code(),
            3
        );
    }

    #[test]
    fn test_format_error_lists_causes() {
        let target: TypeDescriptor = "List<List<int>>".parse().unwrap();
        let source = Value::from_json_str(r#"[["1"], ["x"]]"#).unwrap();
        let err: Error = default_registry().convert(&source, &target).unwrap_err().into();

        let formatted = format_error(&err, false);
        assert!(formatted.starts_with("Error: Failed to convert"), "{}", formatted);
        assert!(formatted.contains("element 1 could not be converted"));
        assert!(formatted.contains("caused by:"), "{}", formatted);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_not_found_shows_help() {
        let err: Error = shapeshift_core::ConversionBus::builder()
            .build()
            .get_for(&TypeDescriptor::i32())
            .unwrap_err()
            .into();
        assert!(err.should_show_help());
        assert!(!Error::other("x").should_show_help());
    }
}
