//! Error types for the Shapeshift core library
//!
//! This module defines the error taxonomy of the conversion engine using
//! thiserror. Every failure is synchronous and propagates straight out of the
//! call that produced it; composite conversions never return partial results.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use crate::types::TypeDescriptor;
use thiserror::Error;

/// Main error type for Shapeshift operations
#[derive(Error, Debug)]
pub enum Error {
    /// No registration (including the parent chain) matched the type pair
    #[error("No converter found which converts a value of type {source_type} to a value of type {target_type}")]
    ConverterNotFound {
        source_type: TypeDescriptor,
        target_type: TypeDescriptor,
    },

    /// The value's shape, range or precision violates the target's rules
    #[error("Failed to convert {value} to {target}: {message}")]
    ConversionFailed {
        value: String,
        target: String,
        message: String,
        #[source]
        cause: Option<Box<Error>>,
    },

    /// A scalar value could not be coerced (parse errors, unknown enum keys)
    #[error("Cannot coerce {value} into {target}: {message}")]
    CoercionFailed {
        value: String,
        target: String,
        message: String,
    },

    /// A field validator rejected a converted value
    #[error("Validation failed for field '{field}': {message}")]
    Validation {
        field: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Builder misuse or an inconsistent type catalog
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// JSON bridge errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a not-found error for a type pair
    pub fn not_found(source_type: &TypeDescriptor, target_type: &TypeDescriptor) -> Self {
        Self::ConverterNotFound {
            source_type: source_type.clone(),
            target_type: target_type.clone(),
        }
    }

    /// Create a conversion failure without a cause
    pub fn conversion_failed(
        value: impl std::fmt::Display,
        target: impl std::fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self::ConversionFailed {
            value: value.to_string(),
            target: target.to_string(),
            message: message.into(),
            cause: None,
        }
    }

    /// Create a conversion failure that wraps the failure of a nested step
    pub fn conversion_failed_with(
        value: impl std::fmt::Display,
        target: impl std::fmt::Display,
        message: impl Into<String>,
        cause: Error,
    ) -> Self {
        Self::ConversionFailed {
            value: value.to_string(),
            target: target.to_string(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Create a scalar coercion failure
    pub fn coercion_failed(
        value: impl std::fmt::Display,
        target: impl std::fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self::CoercionFailed {
            value: value.to_string(),
            target: target.to_string(),
            message: message.into(),
        }
    }

    /// Create a validation failure
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error means no converter exists for a type pair
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConverterNotFound { .. })
    }

    /// Whether this error is a failure of the value itself rather than of
    /// converter resolution
    pub fn is_conversion_failure(&self) -> bool {
        matches!(
            self,
            Self::ConversionFailed { .. } | Self::CoercionFailed { .. } | Self::Validation { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
