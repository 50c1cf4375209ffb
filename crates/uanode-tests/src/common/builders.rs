// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Fluent builders for default payloads and model descriptions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use uanode_config::{ChildDescription, ModelDescription, ModelInfo, TypeDescription};
use uanode_core::{AttributeOverrides, Base64JsonDecoder, EncodedDefaults, NodeId, Variant};

// =============================================================================
// Overrides Builder
// =============================================================================

/// Builder for attribute overrides and their encoded payloads.
#[derive(Debug, Clone, Default)]
pub struct OverridesBuilder {
    overrides: AttributeOverrides,
}

impl OverridesBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name.
    pub fn display_name(mut self, text: impl Into<String>) -> Self {
        self.overrides.display_name = Some(text.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.overrides.description = Some(text.into());
        self
    }

    /// Sets the data type.
    pub fn data_type(mut self, data_type: NodeId) -> Self {
        self.overrides.data_type = Some(data_type);
        self
    }

    /// Sets a scalar value rank.
    pub fn scalar(mut self) -> Self {
        self.overrides.value_rank = Some(-1);
        self
    }

    /// Sets the access level bits.
    pub fn access_level(mut self, bits: u8) -> Self {
        self.overrides.access_level = Some(bits);
        self
    }

    /// Sets the default value.
    pub fn value(mut self, value: impl Into<Variant>) -> Self {
        self.overrides.value = Some(value.into());
        self
    }

    /// Returns the overrides.
    pub fn build(self) -> AttributeOverrides {
        self.overrides
    }

    /// Returns the base64 text of the JSON document, as found in model files.
    pub fn to_base64(&self) -> String {
        let json = serde_json::to_vec(&self.overrides).expect("overrides serialize to JSON");
        BASE64.encode(json)
    }

    /// Returns a version 1 payload.
    pub fn encode(&self) -> EncodedDefaults {
        EncodedDefaults::new(Base64JsonDecoder::VERSION, self.to_base64().into_bytes())
    }
}

// =============================================================================
// Description Builder
// =============================================================================

/// Builder for model descriptions.
#[derive(Debug, Clone)]
pub struct DescriptionBuilder {
    description: ModelDescription,
}

impl DescriptionBuilder {
    /// Creates a builder for a named model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            description: ModelDescription {
                model: ModelInfo {
                    name: name.into(),
                    version: "1.0".to_string(),
                    defaults_version: Base64JsonDecoder::VERSION,
                },
                namespaces: Vec::new(),
                types: Vec::new(),
            },
        }
    }

    /// Sets the payload version.
    pub fn defaults_version(mut self, version: u16) -> Self {
        self.description.model.defaults_version = version;
        self
    }

    /// Appends a namespace URI to the local table.
    pub fn namespace(mut self, uri: impl Into<String>) -> Self {
        self.description.namespaces.push(uri.into());
        self
    }

    /// Adds an object type.
    pub fn object_type(self, id: &str, name: &str, super_type: Option<&str>) -> Self {
        self.add_type(id, name, "ObjectType", super_type)
    }

    /// Adds a variable type.
    pub fn variable_type(self, id: &str, name: &str, super_type: Option<&str>) -> Self {
        self.add_type(id, name, "VariableType", super_type)
    }

    fn add_type(mut self, id: &str, name: &str, class: &str, super_type: Option<&str>) -> Self {
        self.description.types.push(TypeDescription {
            id: id.to_string(),
            symbolic_name: name.to_string(),
            node_class: class.to_string(),
            super_type: super_type.map(str::to_string),
            defaults: None,
            children: Vec::new(),
        });
        self
    }

    /// Sets the defaults of the most recently added type.
    pub fn type_defaults(mut self, defaults: &OverridesBuilder) -> Self {
        if let Some(last) = self.description.types.last_mut() {
            last.defaults = Some(defaults.to_base64());
        }
        self
    }

    /// Adds a child slot to the most recently added type.
    pub fn child(
        mut self,
        browse_name: &str,
        child_type: &str,
        optional: bool,
        defaults: Option<&OverridesBuilder>,
    ) -> Self {
        if let Some(last) = self.description.types.last_mut() {
            last.children.push(ChildDescription {
                browse_name: browse_name.to_string(),
                child_type: child_type.to_string(),
                optional,
                defaults: defaults.map(OverridesBuilder::to_base64),
            });
        }
        self
    }

    /// Adds a child slot with a raw payload string.
    pub fn child_with_payload(mut self, browse_name: &str, child_type: &str, payload: &str) -> Self {
        if let Some(last) = self.description.types.last_mut() {
            last.children.push(ChildDescription {
                browse_name: browse_name.to_string(),
                child_type: child_type.to_string(),
                optional: false,
                defaults: Some(payload.to_string()),
            });
        }
        self
    }

    /// Returns the description.
    pub fn build(self) -> ModelDescription {
        self.description
    }

    /// Returns the description as JSON text.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.description).expect("description serializes to JSON")
    }
}
