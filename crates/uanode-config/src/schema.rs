// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions.
//!
//! Two documents are described here: the model description compiled from a
//! NodeSet, and the host configuration that says which model descriptions to
//! load and how to log.
//!
//! # Schema Structure
//!
//! ```text
//! ModelDescription
//! ├── model: ModelInfo
//! ├── namespaces: Vec<String>
//! └── types: Vec<TypeDescription>
//!     └── children: Vec<ChildDescription>
//!
//! NodeModelConfig
//! ├── model: ModelSourceConfig
//! └── logging: LoggingConfig
//! ```
//!
//! Keys are snake_case throughout; the YAML reader folds key case.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uanode_core::{Base64JsonDecoder, NodeClass, NodeId};

use crate::error::{ConfigError, ConfigResult};
use crate::loader::ConfigFormat;

// =============================================================================
// ModelDescription
// =============================================================================

/// A compiled node model: namespaces plus type schemas with encoded defaults.
///
/// Namespace indices inside a description are local to it: index 0 is the
/// OPC UA base namespace and index `n` is the `n`-th entry of
/// [`namespaces`](Self::namespaces). The loader remaps them onto the merged
/// registry's namespace table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    /// Model metadata.
    pub model: ModelInfo,

    /// Namespace URIs, local index 1 first.
    #[serde(default)]
    pub namespaces: Vec<String>,

    /// Type schemas.
    #[serde(default)]
    pub types: Vec<TypeDescription>,
}

impl ModelDescription {
    /// Validates structure and text fields.
    ///
    /// Cross-type checks (unknown references, cycles) happen when the
    /// registry is built.
    pub fn validate(&self) -> ConfigResult<()> {
        self.model.validate()?;

        let mut seen = HashSet::new();
        for (i, uri) in self.namespaces.iter().enumerate() {
            if uri.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("namespaces[{}]", i),
                    "namespace URI must not be empty",
                ));
            }
            if !seen.insert(uri.as_str()) {
                return Err(ConfigError::validation(
                    format!("namespaces[{}]", i),
                    format!("duplicate namespace URI '{}'", uri),
                ));
            }
        }

        let max_index = self.namespaces.len();
        for (i, ty) in self.types.iter().enumerate() {
            ty.validate(&format!("types[{}]", i), max_index)?;
        }

        Ok(())
    }

    /// Looks up a type description by symbolic name.
    pub fn get_type(&self, symbolic_name: &str) -> Option<&TypeDescription> {
        self.types.iter().find(|t| t.symbolic_name == symbolic_name)
    }
}

// =============================================================================
// ModelInfo
// =============================================================================

/// Model metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name.
    pub name: String,

    /// Model version, as published.
    #[serde(default)]
    pub version: String,

    /// Format version of every encoded default payload in the file.
    #[serde(default = "default_defaults_version")]
    pub defaults_version: u16,
}

impl ModelInfo {
    /// Validates the metadata.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::missing_field("model.name"));
        }
        Ok(())
    }
}

fn default_defaults_version() -> u16 {
    Base64JsonDecoder::VERSION
}

// =============================================================================
// TypeDescription
// =============================================================================

/// One ObjectType or VariableType.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescription {
    /// Type NodeId text, e.g. `ns=2;i=1004`.
    pub id: String,

    /// Symbolic name, e.g. `MotionDeviceType`.
    pub symbolic_name: String,

    /// `ObjectType` or `VariableType`.
    #[serde(default = "default_node_class")]
    pub node_class: String,

    /// Supertype, by NodeId text or symbolic name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,

    /// Base64 text of the type-level default payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<String>,

    /// Child slots in browse order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildDescription>,
}

impl TypeDescription {
    /// Parses the type NodeId.
    pub fn node_id(&self) -> ConfigResult<NodeId> {
        Ok(self.id.parse()?)
    }

    /// Parses the node class.
    pub fn node_class(&self) -> ConfigResult<NodeClass> {
        Ok(self.node_class.parse()?)
    }

    fn validate(&self, field: &str, max_namespace: usize) -> ConfigResult<()> {
        if self.symbolic_name.trim().is_empty() {
            return Err(ConfigError::missing_field(format!("{}.symbolic_name", field)));
        }

        let id = self.node_id().map_err(|e| {
            ConfigError::validation(format!("{}.id", field), e.to_string())
        })?;
        if usize::from(id.namespace_index) > max_namespace {
            return Err(ConfigError::validation(
                format!("{}.id", field),
                format!(
                    "namespace index {} is not declared in 'namespaces'",
                    id.namespace_index
                ),
            ));
        }

        let class = self.node_class().map_err(|e| {
            ConfigError::validation(format!("{}.node_class", field), e.to_string())
        })?;
        if !class.is_type() {
            return Err(ConfigError::validation(
                format!("{}.node_class", field),
                format!("expected ObjectType or VariableType, got {}", class),
            ));
        }

        if matches!(&self.super_type, Some(s) if s.trim().is_empty()) {
            return Err(ConfigError::validation(
                format!("{}.super_type", field),
                "must not be empty",
            ));
        }

        for (i, child) in self.children.iter().enumerate() {
            child.validate(&format!("{}.children[{}]", field, i))?;
        }

        Ok(())
    }
}

fn default_node_class() -> String {
    NodeClass::ObjectType.name().to_string()
}

// =============================================================================
// ChildDescription
// =============================================================================

/// One child slot of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDescription {
    /// Browse name, `<ns>:<name>` with a local namespace index.
    pub browse_name: String,

    /// Declared child type, by NodeId text or symbolic name.
    #[serde(rename = "type")]
    pub child_type: String,

    /// Optional children are materialized on demand only.
    #[serde(default)]
    pub optional: bool,

    /// Base64 text of the per-slot default payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<String>,
}

impl ChildDescription {
    fn validate(&self, field: &str) -> ConfigResult<()> {
        if self.browse_name.trim().is_empty() {
            return Err(ConfigError::missing_field(format!("{}.browse_name", field)));
        }
        if self.child_type.trim().is_empty() {
            return Err(ConfigError::missing_field(format!("{}.type", field)));
        }
        Ok(())
    }
}

// =============================================================================
// NodeModelConfig
// =============================================================================

/// Host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeModelConfig {
    /// Which model descriptions to load.
    #[serde(default)]
    pub model: ModelSourceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NodeModelConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.model.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Model source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSourceConfig {
    /// Model description files, merged in order.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Reject default payloads the bundled decoder cannot read.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl ModelSourceConfig {
    /// Validates the model sources.
    pub fn validate(&self) -> ConfigResult<()> {
        for (i, file) in self.files.iter().enumerate() {
            ConfigFormat::from_path(file).map_err(|e| {
                ConfigError::validation(format!("model.files[{}]", i), e.to_string())
            })?;
        }
        Ok(())
    }
}

impl Default for ModelSourceConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            strict: default_strict(),
        }
    }
}

fn default_strict() -> bool {
    true
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log file path. Logs go to stdout when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Include event targets in logs.
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

impl LoggingConfig {
    /// Validates the logging configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(file) = &self.file {
            if file.as_os_str().is_empty() {
                return Err(ConfigError::validation("logging.file", "must not be empty"));
            }
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file: None,
            with_target: default_with_target(),
        }
    }
}

fn default_with_target() -> bool {
    true
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name; `warning` is accepted for `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON lines for log collectors.
    Json,
}

impl LogFormat {
    /// Parses a format name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
