// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Encoded default store.
//!
//! A node type (and optionally each child slot of a type) carries an
//! [`EncodedDefaults`] payload: a compact, versioned, opaque blob holding the
//! default attribute values a freshly materialized node starts with. The
//! byte layout belongs to the host stack. This layer never looks inside it;
//! it hands the payload to a [`DefaultsDecoder`] and merges the resulting
//! [`AttributeOverrides`] into the node's [`NodeAttributes`].
//!
//! [`Base64JsonDecoder`] is the decoder used by the bundled models: version 1
//! payloads are base64 text wrapping a JSON `AttributeOverrides` document.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{DefaultsError, ModelResult};
use crate::types::{AccessLevel, NodeClass, NodeId, QualifiedName, Variant};

/// Value rank of a scalar variable.
pub const VALUE_RANK_SCALAR: i32 = -1;

// =============================================================================
// EncodedDefaults
// =============================================================================

/// An immutable, versioned default-attribute payload.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedDefaults {
    version: u16,
    payload: Arc<[u8]>,
}

impl EncodedDefaults {
    /// Wraps a payload.
    pub fn new(version: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            version,
            payload: Arc::from(payload.into()),
        }
    }

    /// Returns the payload format version.
    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Returns the raw payload.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Debug for EncodedDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedDefaults")
            .field("version", &self.version)
            .field("len", &self.payload.len())
            .finish()
    }
}

// =============================================================================
// AttributeOverrides
// =============================================================================

/// Decoded default attributes. Unset fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeOverrides {
    /// Display name text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Description text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Data type of a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<NodeId>,

    /// Value rank of a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_rank: Option<i32>,

    /// Access level bits of a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<u8>,

    /// Default value of a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Variant>,
}

impl AttributeOverrides {
    /// Returns `true` if nothing is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// NodeAttributes
// =============================================================================

/// Attribute values of a materialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Browse name.
    pub browse_name: QualifiedName,

    /// Display name text.
    pub display_name: String,

    /// Description text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Instance node class (Object or Variable).
    pub node_class: NodeClass,

    /// Data type of a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<NodeId>,

    /// Value rank of a variable.
    pub value_rank: i32,

    /// Access level of a variable.
    #[serde(with = "access_level_bits")]
    pub access_level: AccessLevel,

    /// Current value of a variable.
    #[serde(default)]
    pub value: Variant,
}

impl NodeAttributes {
    /// Creates the pre-default attribute set of a node.
    ///
    /// Variables start readable and scalar; the display name is the browse
    /// name until a payload overrides it.
    pub fn new(browse_name: QualifiedName, node_class: NodeClass) -> Self {
        let access_level = if node_class == NodeClass::Variable {
            AccessLevel::READ_ONLY
        } else {
            AccessLevel::empty()
        };

        Self {
            display_name: browse_name.name.clone(),
            browse_name,
            description: None,
            node_class,
            data_type: None,
            value_rank: VALUE_RANK_SCALAR,
            access_level,
            value: Variant::Null,
        }
    }

    /// Merges decoded overrides into these attributes.
    pub fn apply(&mut self, overrides: &AttributeOverrides) {
        if let Some(ref display_name) = overrides.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(ref description) = overrides.description {
            self.description = Some(description.clone());
        }
        if let Some(ref data_type) = overrides.data_type {
            self.data_type = Some(data_type.clone());
        }
        if let Some(value_rank) = overrides.value_rank {
            self.value_rank = value_rank;
        }
        if let Some(bits) = overrides.access_level {
            self.access_level = AccessLevel::from_bits_truncate(bits);
        }
        if let Some(ref value) = overrides.value {
            self.value = value.clone();
        }
    }

    /// Returns `true` if this is a variable.
    pub fn is_variable(&self) -> bool {
        self.node_class == NodeClass::Variable
    }
}

mod access_level_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::AccessLevel;

    pub fn serialize<S: Serializer>(level: &AccessLevel, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(level.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AccessLevel, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(AccessLevel::from_bits_truncate(bits))
    }
}

// =============================================================================
// DefaultsDecoder
// =============================================================================

/// Decoder for default payloads, supplied by the host stack.
pub trait DefaultsDecoder: Send + Sync + fmt::Debug {
    /// Decodes a payload into attribute overrides.
    fn decode(&self, defaults: &EncodedDefaults) -> ModelResult<AttributeOverrides>;
}

impl<T: DefaultsDecoder + ?Sized> DefaultsDecoder for Arc<T> {
    fn decode(&self, defaults: &EncodedDefaults) -> ModelResult<AttributeOverrides> {
        (**self).decode(defaults)
    }
}

// =============================================================================
// Base64JsonDecoder
// =============================================================================

/// Decoder for version 1 payloads: base64 text of a JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64JsonDecoder;

impl Base64JsonDecoder {
    /// The payload version this decoder understands.
    pub const VERSION: u16 = 1;

    /// Creates a decoder.
    pub fn new() -> Self {
        Self
    }

    /// Encodes overrides into a version 1 payload.
    ///
    /// Model tooling and tests use this to produce payloads; the engine only
    /// ever decodes.
    pub fn encode(overrides: &AttributeOverrides) -> ModelResult<EncodedDefaults> {
        let json = serde_json::to_vec(overrides)
            .map_err(|e| DefaultsError::malformed(format!("JSON encoding failed: {}", e)))?;
        Ok(EncodedDefaults::new(Self::VERSION, BASE64.encode(json).into_bytes()))
    }
}

impl DefaultsDecoder for Base64JsonDecoder {
    fn decode(&self, defaults: &EncodedDefaults) -> ModelResult<AttributeOverrides> {
        if defaults.version() != Self::VERSION {
            return Err(DefaultsError::UnsupportedVersion {
                version: defaults.version(),
                supported: Self::VERSION,
            }
            .into());
        }

        let text: Vec<u8> = defaults
            .payload()
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let json = BASE64
            .decode(text)
            .map_err(|e| DefaultsError::malformed(format!("Invalid base64: {}", e)))?;
        let overrides: AttributeOverrides = serde_json::from_slice(&json)
            .map_err(|e| DefaultsError::malformed(format!("Invalid JSON: {}", e)))?;

        tracing::trace!(len = defaults.len(), "Decoded defaults payload");
        Ok(overrides)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    fn mass_overrides() -> AttributeOverrides {
        AttributeOverrides {
            display_name: Some("Mass".to_string()),
            description: Some("The weight of the load.".to_string()),
            data_type: Some(NodeId::numeric(0, 11)),
            value_rank: Some(VALUE_RANK_SCALAR),
            access_level: Some(AccessLevel::READ_ONLY.bits()),
            value: Some(Variant::Double(0.0)),
        }
    }

    #[test]
    fn test_decode_version_one_payload() {
        let encoded = Base64JsonDecoder::encode(&mass_overrides()).unwrap();
        assert_eq!(encoded.version(), 1);

        let decoded = Base64JsonDecoder::new().decode(&encoded).unwrap();
        assert_eq!(decoded, mass_overrides());
    }

    #[test]
    fn test_decode_is_idempotent() {
        let encoded = Base64JsonDecoder::encode(&mass_overrides()).unwrap();
        let decoder = Base64JsonDecoder::new();

        let first = decoder.decode(&encoded).unwrap();
        let second = decoder.decode(&encoded).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let encoded = EncodedDefaults::new(2, b"e30=".to_vec());
        let err = Base64JsonDecoder::new().decode(&encoded).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Defaults(DefaultsError::UnsupportedVersion { version: 2, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        let decoder = Base64JsonDecoder::new();

        let not_base64 = EncodedDefaults::new(1, b"!!!".to_vec());
        assert!(matches!(
            decoder.decode(&not_base64),
            Err(ModelError::Defaults(DefaultsError::Malformed { .. }))
        ));

        // "{\"color\":1}" - unknown field
        let unknown_field = EncodedDefaults::new(1, b"eyJjb2xvciI6MX0=".to_vec());
        assert!(decoder.decode(&unknown_field).is_err());
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        // "{}" split across lines
        let encoded = EncodedDefaults::new(1, b"e3\n0=".to_vec());
        let decoded = Base64JsonDecoder::new().decode(&encoded).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_apply_overrides() {
        let mut attrs = NodeAttributes::new(QualifiedName::new(2, "Mass"), NodeClass::Variable);
        assert_eq!(attrs.display_name, "Mass");
        assert_eq!(attrs.access_level, AccessLevel::READ_ONLY);

        attrs.apply(&AttributeOverrides {
            description: Some("kg".to_string()),
            value: Some(Variant::Double(12.5)),
            access_level: Some(0x03),
            ..Default::default()
        });

        assert_eq!(attrs.description.as_deref(), Some("kg"));
        assert_eq!(attrs.value, Variant::Double(12.5));
        assert_eq!(attrs.access_level, AccessLevel::READ_WRITE);
        assert_eq!(attrs.display_name, "Mass");
    }

    #[test]
    fn test_object_attributes_have_no_access_level() {
        let attrs = NodeAttributes::new(QualifiedName::standard("Axes"), NodeClass::Object);
        assert!(attrs.access_level.is_empty());
        assert!(!attrs.is_variable());
    }
}
