// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Loading of host configuration and model descriptions.
//!
//! # Loading Pipeline
//!
//! ```text
//! file ──► read ──► ${VAR:default} ──► parse (yaml/toml/json)
//!                                          │
//!          NodeModelConfig ◄── validate ◄──┤── env overrides, relative paths
//!          ModelDescription ◄── validate ◄─┘
//!
//! ModelDescription* ──► ModelLoader ──► namespace remap ──► NodeTypeRegistry
//! ```
//!
//! # Environment Variable Override
//!
//! Host configuration values can be overridden using environment variables:
//!
//! ```text
//! UANODE_MODEL_FILES=models/di.yaml,models/robotics.yaml
//! UANODE_MODEL_STRICT=false
//! UANODE_LOG_LEVEL=debug
//! UANODE_LOG_FORMAT=json
//! UANODE_LOG_FILE=/var/log/uanode.log
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uanode_core::registry::UA_NAMESPACE_URI;
use uanode_core::{
    Base64JsonDecoder, ChildSlot, DefaultsDecoder, DefaultsError, EncodedDefaults, ModelError,
    NodeId, NodeTypeRegistry, NodeTypeSchema, QualifiedName,
};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, ModelDescription, NodeModelConfig, TypeDescription};

// =============================================================================
// ConfigLoader
// =============================================================================

/// Reads configuration documents from files or strings.
///
/// # Examples
///
/// ```no_run
/// use uanode_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("uanode.yaml").unwrap();
/// let model = loader.load_model("models/robotics.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for resolving relative paths.
    base_path: Option<PathBuf>,

    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve environment variables in values.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: "UANODE".to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the base path for resolving relative paths.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads the host configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<NodeModelConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self.base_path.clone().unwrap_or_else(|| {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config: NodeModelConfig = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            self.resolve_relative_paths(&mut config, &base_path);
        }

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configured {} model files", config.model.files.len());

        Ok(config)
    }

    /// Loads the host configuration from a string.
    ///
    /// Relative paths are resolved only when a base path is set.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<NodeModelConfig> {
        let content = self.substitute(content)?;
        let mut config: NodeModelConfig = self.parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            if let Some(base_path) = &self.base_path {
                self.resolve_relative_paths(&mut config, base_path);
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Loads a model description from a file.
    pub fn load_model(&self, path: impl AsRef<Path>) -> ConfigResult<ModelDescription> {
        let path = path.as_ref();
        info!("Loading model description from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let model: ModelDescription = self.parse_content(&content, format, path)?;
        model.validate()?;

        debug!(
            model = %model.model.name,
            version = %model.model.version,
            "Loaded {} types in {} namespaces",
            model.types.len(),
            model.namespaces.len()
        );

        Ok(model)
    }

    /// Loads a model description from a string.
    pub fn load_model_from_str(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<ModelDescription> {
        let content = self.substitute(content)?;
        let model: ModelDescription = self.parse_str(&content, format)?;
        model.validate()?;
        Ok(model)
    }

    /// Reads file content.
    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Resolves placeholders and parses, attributing failures to `path`.
    fn parse_content<T: DeserializeOwned>(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<T> {
        let content = self.substitute(content)?;

        self.parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    fn substitute(&self, content: &str) -> ConfigResult<String> {
        if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            Ok(content.to_string())
        }
    }

    /// Parses a string based on format.
    fn parse_str<T: DeserializeOwned>(&self, content: &str, format: ConfigFormat) -> ConfigResult<T> {
        match format {
            ConfigFormat::Yaml => yaml_parse(content),
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
            }
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| {
                ConfigError::serialization(format!(
                    "{} (line {}, column {})",
                    e,
                    e.line(),
                    e.column()
                ))
            }),
        }
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports the format: `${VAR_NAME}` or `${VAR_NAME:default}`
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        Ok(result)
    }

    fn env_key(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut NodeModelConfig) -> ConfigResult<()> {
        if let Ok(value) = env::var(self.env_key("MODEL_FILES")) {
            config.model.files = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        if let Ok(value) = env::var(self.env_key("MODEL_STRICT")) {
            config.model.strict = parse_bool(&value);
        }

        if let Ok(value) = env::var(self.env_key("LOG_LEVEL")) {
            config.logging.level = LogLevel::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(
                    self.env_key("LOG_LEVEL"),
                    "expected one of trace, debug, info, warn, error",
                )
            })?;
        }
        if let Ok(value) = env::var(self.env_key("LOG_FORMAT")) {
            config.logging.format = LogFormat::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(
                    self.env_key("LOG_FORMAT"),
                    "expected one of text, compact, json",
                )
            })?;
        }
        if let Ok(value) = env::var(self.env_key("LOG_FILE")) {
            config.logging.file = Some(PathBuf::from(value));
        }

        Ok(())
    }

    /// Resolves relative paths in configuration.
    fn resolve_relative_paths(&self, config: &mut NodeModelConfig, base_path: &Path) {
        for file in &mut config.model.files {
            if file.is_relative() {
                *file = base_path.join(&file);
            }
        }

        if let Some(ref mut log_file) = config.logging.file {
            if log_file.is_relative() {
                *log_file = base_path.join(&log_file);
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    base_path: Option<PathBuf>,
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    resolve_paths: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base path.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables path resolution.
    pub fn resolve_paths(mut self, enabled: bool) -> Self {
        self.resolve_paths = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(base_path) = self.base_path {
            loader.base_path = Some(base_path);
        }
        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(resolve_paths) = self.resolve_paths {
            loader.resolve_paths = resolve_paths;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// ModelLoader
// =============================================================================

/// Merges model descriptions into a [`NodeTypeRegistry`].
///
/// Each description numbers its namespaces locally. The loader builds one
/// namespace table (base namespace first, then URIs in load order) and
/// rewrites every NodeId and browse name onto it. A type declared by more
/// than one description is kept once if the declarations agree on its
/// symbolic name.
///
/// ```no_run
/// use uanode_config::loader::ModelLoader;
///
/// let registry = ModelLoader::new()
///     .load_file("models/di.yaml")?
///     .load_file("models/robotics.yaml")?
///     .build()?;
/// # Ok::<(), uanode_config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ModelLoader {
    loader: ConfigLoader,
    strict: bool,
    descriptions: Vec<ModelDescription>,
}

/// Local namespace index to registry namespace index.
type NamespaceMap = Vec<u16>;

impl ModelLoader {
    /// Creates a loader in strict mode.
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
            strict: true,
            descriptions: Vec::new(),
        }
    }

    /// Uses `loader` to read files.
    pub fn with_config_loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = loader;
        self
    }

    /// In strict mode every default payload must decode with
    /// [`Base64JsonDecoder`] at load time.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Loads and queues a model description file.
    pub fn load_file(mut self, path: impl AsRef<Path>) -> ConfigResult<Self> {
        let description = self.loader.load_model(path)?;
        self.descriptions.push(description);
        Ok(self)
    }

    /// Parses and queues a model description.
    pub fn load_str(mut self, content: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let description = self.loader.load_model_from_str(content, format)?;
        self.descriptions.push(description);
        Ok(self)
    }

    /// Queues an already parsed description.
    pub fn add_description(mut self, description: ModelDescription) -> ConfigResult<Self> {
        description.validate()?;
        self.descriptions.push(description);
        Ok(self)
    }

    /// Returns the number of queued descriptions.
    pub fn description_count(&self) -> usize {
        self.descriptions.len()
    }

    /// Builds the registry for the files named in a host configuration.
    pub fn from_config(config: &NodeModelConfig) -> ConfigResult<NodeTypeRegistry> {
        if config.model.files.is_empty() {
            return Err(ConfigError::missing_field("model.files"));
        }

        let mut loader = ModelLoader::new().strict(config.model.strict);
        for file in &config.model.files {
            loader = loader.load_file(file)?;
        }
        loader.build()
    }

    /// Merges the queued descriptions and builds the registry.
    pub fn build(self) -> ConfigResult<NodeTypeRegistry> {
        let (namespaces, maps) = self.namespace_table()?;
        let symbols = self.symbol_table(&maps)?;

        let mut builder = NodeTypeRegistry::builder();
        for uri in namespaces.iter().skip(1) {
            builder = builder.namespace(uri.as_str());
        }

        let mut declared: HashMap<NodeId, &str> = HashMap::new();
        for (description, map) in self.descriptions.iter().zip(&maps) {
            self.check_defaults_version(description)?;

            for (i, ty) in description.types.iter().enumerate() {
                let type_id = remap_node_id(ty.node_id()?, map)?;
                if let Some(existing) = declared.get(&type_id) {
                    if *existing != ty.symbolic_name {
                        return Err(ConfigError::merge_error(format!(
                            "type {} declared as both '{}' and '{}'",
                            type_id, existing, ty.symbolic_name
                        )));
                    }
                    debug!(type_id = %type_id, model = %description.model.name, "Skipping type declared by an earlier model");
                    continue;
                }
                declared.insert(type_id.clone(), ty.symbolic_name.as_str());

                let field = format!("{}.types[{}]", description.model.name, i);
                builder = builder.add_type(self.build_schema(
                    type_id,
                    ty,
                    description.model.defaults_version,
                    map,
                    &symbols,
                    &field,
                )?);
            }
        }

        let registry = builder.build()?;
        info!(
            "Built node type registry: {} types in {} namespaces from {} models",
            registry.len(),
            registry.namespaces().len(),
            self.descriptions.len()
        );
        Ok(registry)
    }

    fn namespace_table(&self) -> ConfigResult<(Vec<String>, Vec<NamespaceMap>)> {
        let mut namespaces = vec![UA_NAMESPACE_URI.to_string()];
        let mut maps = Vec::with_capacity(self.descriptions.len());

        for description in &self.descriptions {
            let mut map = vec![0u16];
            for uri in &description.namespaces {
                let index = match namespaces.iter().position(|n| n == uri) {
                    Some(index) => index,
                    None => {
                        namespaces.push(uri.clone());
                        namespaces.len() - 1
                    }
                };
                let index = u16::try_from(index)
                    .map_err(|_| ConfigError::merge_error("namespace table exceeds 65535 entries"))?;
                map.push(index);
            }
            maps.push(map);
        }

        Ok((namespaces, maps))
    }

    fn symbol_table(&self, maps: &[NamespaceMap]) -> ConfigResult<HashMap<String, NodeId>> {
        let mut symbols = HashMap::new();

        for (description, map) in self.descriptions.iter().zip(maps) {
            for ty in &description.types {
                let type_id = remap_node_id(ty.node_id()?, map)?;
                match symbols.get(&ty.symbolic_name) {
                    Some(existing) if *existing != type_id => {
                        return Err(ConfigError::merge_error(format!(
                            "symbolic name '{}' names both {} and {}",
                            ty.symbolic_name, existing, type_id
                        )));
                    }
                    Some(_) => {}
                    None => {
                        symbols.insert(ty.symbolic_name.clone(), type_id);
                    }
                }
            }
        }

        Ok(symbols)
    }

    fn check_defaults_version(&self, description: &ModelDescription) -> ConfigResult<()> {
        let version = description.model.defaults_version;
        if self.strict && version != Base64JsonDecoder::VERSION {
            return Err(ModelError::from(DefaultsError::UnsupportedVersion {
                version,
                supported: Base64JsonDecoder::VERSION,
            })
            .into());
        }
        Ok(())
    }

    fn build_schema(
        &self,
        type_id: NodeId,
        ty: &TypeDescription,
        version: u16,
        map: &NamespaceMap,
        symbols: &HashMap<String, NodeId>,
        field: &str,
    ) -> ConfigResult<NodeTypeSchema> {
        let mut schema = NodeTypeSchema::new(type_id, ty.symbolic_name.as_str(), ty.node_class()?);

        if let Some(super_type) = &ty.super_type {
            schema = schema.with_super_type(resolve_type(super_type, map, symbols)?);
        }
        if let Some(text) = &ty.defaults {
            schema = schema.with_defaults(self.encoded(text, version, &format!("{}.defaults", field))?);
        }

        for (i, child) in ty.children.iter().enumerate() {
            let browse_name = remap_name(QualifiedName::from(child.browse_name.trim()), map)?;
            let mut slot = if child.optional {
                ChildSlot::optional(browse_name, resolve_type(&child.child_type, map, symbols)?)
            } else {
                ChildSlot::mandatory(browse_name, resolve_type(&child.child_type, map, symbols)?)
            };
            if let Some(text) = &child.defaults {
                let field = format!("{}.children[{}].defaults", field, i);
                slot = slot.with_defaults(self.encoded(text, version, &field)?);
            }
            schema = schema.with_child(slot);
        }

        Ok(schema)
    }

    fn encoded(&self, text: &str, version: u16, field: &str) -> ConfigResult<EncodedDefaults> {
        let defaults = EncodedDefaults::new(version, text.trim().as_bytes().to_vec());
        if self.strict {
            Base64JsonDecoder::new()
                .decode(&defaults)
                .map_err(|e| ConfigError::validation(field, e.to_string()))?;
        }
        Ok(defaults)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn remap_namespace(index: u16, map: &NamespaceMap) -> ConfigResult<u16> {
    map.get(usize::from(index)).copied().ok_or_else(|| {
        ConfigError::validation(
            "namespaces",
            format!("namespace index {} is not declared", index),
        )
    })
}

fn remap_node_id(mut id: NodeId, map: &NamespaceMap) -> ConfigResult<NodeId> {
    id.namespace_index = remap_namespace(id.namespace_index, map)?;
    Ok(id)
}

fn remap_name(mut name: QualifiedName, map: &NamespaceMap) -> ConfigResult<QualifiedName> {
    name.namespace_index = remap_namespace(name.namespace_index, map)?;
    Ok(name)
}

fn resolve_type(
    text: &str,
    map: &NamespaceMap,
    symbols: &HashMap<String, NodeId>,
) -> ConfigResult<NodeId> {
    let text = text.trim();
    if NodeId::looks_like_node_id(text) {
        return remap_node_id(text.parse()?, map);
    }
    symbols
        .get(text)
        .cloned()
        .ok_or_else(|| ModelError::unknown_type(text).into())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a string to bool.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

/// YAML parsing through the config crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads the host configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<NodeModelConfig> {
    ConfigLoader::new().load(path)
}

/// Loads the host configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<NodeModelConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

/// Loads a host configuration file and builds the registry it names.
pub fn load_registry(path: impl AsRef<Path>) -> ConfigResult<NodeTypeRegistry> {
    let config = load_config(path)?;
    ModelLoader::from_config(&config)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use uanode_core::{AttributeOverrides, SchemaError, Variant};

    fn encoded(display_name: &str) -> String {
        let overrides = AttributeOverrides {
            display_name: Some(display_name.to_string()),
            value: Some(Variant::Double(1.5)),
            ..Default::default()
        };
        let defaults = Base64JsonDecoder::encode(&overrides).unwrap();
        String::from_utf8(defaults.payload().to_vec()).unwrap()
    }

    fn base_yaml() -> String {
        r#"
model:
  name: Base
  version: "1.05"
types:
  - id: "i=58"
    symbolic_name: BaseObjectType
    node_class: ObjectType
  - id: "i=61"
    symbolic_name: FolderType
    super_type: BaseObjectType
  - id: "i=68"
    symbolic_name: PropertyType
    node_class: VariableType
"#
        .to_string()
    }

    fn cell_yaml() -> String {
        format!(
            r#"
model:
  name: Cells
  version: "1.0"
namespaces:
  - "urn:example:cells"
types:
  - id: "ns=1;i=1"
    symbolic_name: CellType
    super_type: "i=58"
    children:
      - browse_name: "1:Stations"
        type: FolderType
      - browse_name: "1:Speed"
        type: PropertyType
        optional: true
        defaults: "{}"
"#,
            encoded("Speed")
        )
    }

    #[test]
    fn test_load_host_yaml() {
        let yaml = r#"
model:
  files:
    - models/base.yaml
    - /opt/models/cells.yaml
  strict: false
logging:
  level: debug
  format: json
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uanode.yaml");
        fs::write(&path, yaml).unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix("UANODE_TEST_HOST_YAML")
            .load(&path)
            .unwrap();

        assert_eq!(config.model.files[0], dir.path().join("models/base.yaml"));
        assert_eq!(config.model.files[1], PathBuf::from("/opt/models/cells.yaml"));
        assert!(!config.model.strict);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_host_toml() {
        let toml = r#"
[model]
files = ["robotics.yaml"]

[logging]
level = "warn"
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix("UANODE_TEST_HOST_TOML")
            .with_path_resolution(false)
            .load(file.path())
            .unwrap();

        assert_eq!(config.model.files, vec![PathBuf::from("robotics.yaml")]);
        assert!(config.model.strict);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("UANODE_TEST_OVERRIDE_MODEL_FILES", "a.yaml, b.json");
        env::set_var("UANODE_TEST_OVERRIDE_MODEL_STRICT", "off");
        env::set_var("UANODE_TEST_OVERRIDE_LOG_LEVEL", "trace");

        let config = ConfigLoader::new()
            .with_env_prefix("UANODE_TEST_OVERRIDE")
            .load_from_str("{}", ConfigFormat::Json)
            .unwrap();

        assert_eq!(
            config.model.files,
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.json")]
        );
        assert!(!config.model.strict);
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_invalid_env_override() {
        env::set_var("UANODE_TEST_BAD_LOG_FORMAT", "xml");

        let result = ConfigLoader::new()
            .with_env_prefix("UANODE_TEST_BAD")
            .load_from_str("{}", ConfigFormat::Json);

        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("model.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("model.YML")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("model.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("model.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("model.xml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("model")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let loader = ConfigLoader::new();
        let result = loader
            .resolve_env_placeholders("name: ${UANODE_TEST_NONEXISTENT_VAR:Cells}")
            .unwrap();
        assert_eq!(result, "name: Cells");
    }

    #[test]
    fn test_env_placeholder_set_and_unclosed() {
        env::set_var("UANODE_TEST_PLACEHOLDER", "Robotics");
        let loader = ConfigLoader::new();

        let result = loader
            .resolve_env_placeholders("${UANODE_TEST_PLACEHOLDER:x} ${unclosed")
            .unwrap();
        assert_eq!(result, "Robotics ${unclosed");

        let result = loader
            .resolve_env_placeholders("${UANODE_TEST_NONEXISTENT_VAR}")
            .unwrap();
        assert_eq!(result, "${UANODE_TEST_NONEXISTENT_VAR}");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("off"));
    }

    #[test]
    fn test_loader_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("MYAPP")
            .resolve_env_vars(false)
            .resolve_paths(true)
            .build();

        assert_eq!(loader.env_prefix, "MYAPP");
        assert!(!loader.resolve_env_vars);
        assert!(loader.resolve_paths);
    }

    #[test]
    fn test_file_not_found() {
        let loader = ConfigLoader::new();
        let result = loader.load("/nonexistent/path/uanode.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{ \"model\": ").unwrap();

        let result = ConfigLoader::new().load_model(file.path());
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_model_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(cell_yaml().as_bytes()).unwrap();

        let model = ConfigLoader::new().load_model(file.path()).unwrap();
        assert_eq!(model.model.name, "Cells");
        assert_eq!(model.model.defaults_version, 1);
        assert_eq!(model.namespaces, vec!["urn:example:cells".to_string()]);

        let cell = model.get_type("CellType").unwrap();
        assert_eq!(cell.children.len(), 2);
        assert_eq!(cell.children[0].child_type, "FolderType");
        assert!(cell.children[1].optional);
    }

    #[test]
    fn test_build_registry_from_two_models() {
        let registry = ModelLoader::new()
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(&cell_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.namespace_index("urn:example:cells"), Some(1));

        let cell = registry.get_by_name("CellType").unwrap();
        assert_eq!(cell.type_id, NodeId::numeric(1, 1));
        assert_eq!(cell.super_type, Some(NodeId::numeric(0, 58)));
        assert_eq!(cell.children[0].child_type, NodeId::numeric(0, 61));
        assert_eq!(cell.children[0].browse_name, QualifiedName::new(1, "Stations"));
        assert!(cell.children[1].defaults.is_some());
    }

    #[test]
    fn test_namespace_indices_are_remapped() {
        let tools = r#"
model:
  name: Tools
namespaces:
  - "urn:example:tools"
  - "urn:example:cells"
types:
  - id: "ns=1;i=7"
    symbolic_name: ToolType
    super_type: "ns=2;i=1"
    children:
      - browse_name: "1:Weight"
        type: "i=68"
"#;
        let registry = ModelLoader::new()
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(&cell_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(tools, ConfigFormat::Yaml)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(registry.namespace_index("urn:example:tools"), Some(2));
        let tool = registry.get_by_name("ToolType").unwrap();
        assert_eq!(tool.type_id, NodeId::numeric(2, 7));
        assert_eq!(tool.super_type, Some(NodeId::numeric(1, 1)));
        assert_eq!(tool.children[0].browse_name, QualifiedName::new(2, "Weight"));
        assert!(registry.is_subtype_of(&tool.type_id, &NodeId::numeric(0, 58)));
    }

    #[test]
    fn test_repeated_base_types_are_merged() {
        let registry = ModelLoader::new()
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_conflicting_declarations() {
        let other = base_yaml().replace("symbolic_name: FolderType", "symbolic_name: DirectoryType");
        let result = ModelLoader::new()
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(&other, ConfigFormat::Yaml)
            .unwrap()
            .build();
        assert!(matches!(result, Err(ConfigError::MergeError { .. })));
    }

    #[test]
    fn test_unknown_symbolic_reference() {
        let result = ModelLoader::new()
            .load_str(&cell_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .build();

        match result {
            Err(ConfigError::Model(ModelError::Schema(SchemaError::UnknownType { type_ref }))) => {
                assert_eq!(type_ref, "FolderType")
            }
            other => panic!("expected unknown type, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_checks_payloads() {
        let broken = cell_yaml().replace(&encoded("Speed"), "not base64!");

        let result = ModelLoader::new()
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(&broken, ConfigFormat::Yaml)
            .unwrap()
            .build();
        match result {
            Err(ConfigError::Validation { field, .. }) => {
                assert_eq!(field, "Cells.types[0].children[1].defaults")
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let registry = ModelLoader::new()
            .strict(false)
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(&broken, ConfigFormat::Yaml)
            .unwrap()
            .build()
            .unwrap();
        assert!(registry.get_by_name("CellType").is_ok());
    }

    #[test]
    fn test_strict_mode_checks_version() {
        let v2 = cell_yaml().replace("version: \"1.0\"", "version: \"1.0\"\n  defaults_version: 2");

        let result = ModelLoader::new()
            .load_str(&base_yaml(), ConfigFormat::Yaml)
            .unwrap()
            .load_str(&v2, ConfigFormat::Yaml)
            .unwrap()
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::Model(ModelError::Defaults(DefaultsError::UnsupportedVersion {
                version: 2,
                ..
            })))
        ));
    }

    #[test]
    fn test_registry_from_host_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.yaml"), base_yaml()).unwrap();
        fs::write(dir.path().join("cells.yaml"), cell_yaml()).unwrap();
        fs::write(
            dir.path().join("uanode.toml"),
            "[model]\nfiles = [\"base.yaml\", \"cells.yaml\"]\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix("UANODE_TEST_FROM_CONFIG")
            .load(dir.path().join("uanode.toml"))
            .unwrap();
        let registry = ModelLoader::from_config(&config).unwrap();
        assert_eq!(registry.len(), 4);

        let empty = NodeModelConfig::default();
        assert!(matches!(
            ModelLoader::from_config(&empty),
            Err(ConfigError::MissingField { .. })
        ));
    }
}
