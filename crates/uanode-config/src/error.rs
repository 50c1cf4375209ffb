// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for uanode-config.
//!
//! Covers reading and parsing model description and host configuration
//! files, validating them, and turning them into a type registry. Model
//! errors raised while building the registry are wrapped, not flattened.

use std::path::PathBuf;

use thiserror::Error;
use uanode_core::ModelError;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a configuration file.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Required field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Environment variable has an unusable value.
    #[error("Invalid environment variable value for '{name}': {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The file extension maps to no supported format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The rejected extension.
        format: String,
    },

    /// Two model descriptions could not be merged.
    #[error("Failed to merge model descriptions: {message}")]
    MergeError {
        /// Error message.
        message: String,
    },

    /// Content did not deserialize.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// The subscriber could not be installed.
    #[error("Failed to initialize logging: {message}")]
    Logging {
        /// Error message.
        message: String,
    },

    /// The described model is invalid.
    #[error("Invalid node model: {0}")]
    Model(#[from] ModelError),
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a merge error.
    pub fn merge_error(message: impl Into<String>) -> Self {
        Self::MergeError {
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a logging initialization error.
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is related to file I/O.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ConfigError::Io { .. } | ConfigError::FileNotFound { .. })
    }

    /// Returns the wrapped model error, if any.
    pub fn as_model_error(&self) -> Option<&ModelError> {
        match self {
            ConfigError::Model(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => "parse",
            ConfigError::Validation { .. } => "validation",
            ConfigError::MissingField { .. } => "missing_field",
            ConfigError::Io { .. } => "io",
            ConfigError::FileNotFound { .. } => "file_not_found",
            ConfigError::InvalidEnvVar { .. } => "invalid_env_var",
            ConfigError::UnsupportedFormat { .. } => "unsupported_format",
            ConfigError::MergeError { .. } => "merge_error",
            ConfigError::Serialization { .. } => "serialization",
            ConfigError::Logging { .. } => "logging",
            ConfigError::Model(_) => "model",
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uanode_core::SchemaError;

    #[test]
    fn test_error_display() {
        let err = ConfigError::validation("types[0].id", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation failed for 'types[0].id': must not be empty"
        );
        assert_eq!(err.error_type(), "validation");
    }

    #[test]
    fn test_model_error_wrapping() {
        let err: ConfigError = ModelError::from(SchemaError::unknown_type("GripperType")).into();
        assert_eq!(err.error_type(), "model");
        assert!(err.to_string().contains("GripperType"));
        assert!(err.as_model_error().is_some());
    }

    #[test]
    fn test_is_io_error() {
        assert!(ConfigError::file_not_found("/missing.yaml").is_io_error());
        assert!(!ConfigError::unsupported_format("txt").is_io_error());
    }
}
