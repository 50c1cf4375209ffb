// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Address-space value types shared by the node model.
//!
//! - **NodeId**: the four OPC UA identifier kinds, parsed from and printed to
//!   the `ns=<n>;{i|s|g|b}=<id>` text form
//! - **QualifiedName**: namespace-qualified browse names
//! - **NodeClass**: node classes the model instantiates or declares
//! - **AccessLevel**: access level bit flags
//! - **Variant**: default attribute values
//!
//! # Examples
//!
//! ```
//! use uanode_core::types::{NodeId, QualifiedName};
//!
//! let id: NodeId = "ns=2;i=1004".parse().unwrap();
//! assert_eq!(id, NodeId::numeric(2, 1004));
//!
//! let name = QualifiedName::from("2:FlangeLoad");
//! assert_eq!(name.namespace_index, 2);
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{ModelError, SchemaError};

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA node identifier.
///
/// Type identifiers in the registry and data type references in default
/// attributes are both `NodeId`s. Serialized as its text form so model
/// description files can write `"ns=2;i=1004"` directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Namespace index (0 = OPC UA base namespace).
    pub namespace_index: u16,

    /// The identifier within the namespace.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    /// Creates a numeric node ID.
    #[inline]
    pub const fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }

    /// Creates an opaque node ID.
    #[inline]
    pub fn opaque(namespace_index: u16, value: Vec<u8>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Opaque(value),
        }
    }

    /// Converts to the OPC UA string format.
    ///
    /// ```
    /// use uanode_core::types::NodeId;
    ///
    /// assert_eq!(NodeId::numeric(0, 68).to_opc_string(), "i=68");
    /// assert_eq!(NodeId::string(2, "Robot").to_opc_string(), "ns=2;s=Robot");
    /// ```
    pub fn to_opc_string(&self) -> String {
        let id_str = match &self.identifier {
            NodeIdentifier::Numeric(v) => format!("i={}", v),
            NodeIdentifier::String(v) => format!("s={}", v),
            NodeIdentifier::Guid(v) => format!("g={}", v),
            NodeIdentifier::Opaque(v) => format!("b={}", BASE64.encode(v)),
        };

        if self.namespace_index == 0 {
            id_str
        } else {
            format!("ns={};{}", self.namespace_index, id_str)
        }
    }

    /// Returns `true` if the string looks like a node ID rather than a
    /// symbolic name.
    pub fn looks_like_node_id(s: &str) -> bool {
        let s = s.trim();
        s.starts_with("ns=")
            || s.starts_with("i=")
            || s.starts_with("s=")
            || s.starts_with("g=")
            || s.starts_with("b=")
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::numeric(0, 0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_opc_string())
    }
}

impl FromStr for NodeId {
    type Err = ModelError;

    /// Parses `ns=2;i=1001`, `ns=2;s=Name`, `ns=2;g=<uuid>`, `ns=2;b=<base64>`,
    /// or the same forms without the `ns=` prefix for namespace 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: String| ModelError::from(SchemaError::invalid_type_ref(s, reason));

        let (namespace_index, identifier_part) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (ns_str, id) = rest
                    .split_once(';')
                    .ok_or_else(|| invalid("Missing identifier after namespace".to_string()))?;
                let ns: u16 = ns_str
                    .parse()
                    .map_err(|_| invalid("Invalid namespace index".to_string()))?;
                (ns, id)
            }
            None => (0, s),
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            let value: u32 = id
                .parse()
                .map_err(|_| invalid("Invalid numeric identifier".to_string()))?;
            NodeIdentifier::Numeric(value)
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            NodeIdentifier::String(id.to_string())
        } else if let Some(id) = identifier_part.strip_prefix("g=") {
            let uuid = Uuid::parse_str(id).map_err(|e| invalid(format!("Invalid GUID: {}", e)))?;
            NodeIdentifier::Guid(uuid)
        } else if let Some(id) = identifier_part.strip_prefix("b=") {
            let bytes = BASE64
                .decode(id)
                .map_err(|e| invalid(format!("Invalid base64: {}", e)))?;
            NodeIdentifier::Opaque(bytes)
        } else {
            return Err(invalid(
                "Unknown identifier type. Expected i=, s=, g=, or b=".to_string(),
            ));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_opc_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// The identifier part of a [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdentifier {
    /// Numeric identifier (`i=`).
    Numeric(u32),
    /// String identifier (`s=`).
    String(String),
    /// GUID identifier (`g=`).
    Guid(Uuid),
    /// Opaque byte string identifier (`b=`).
    Opaque(Vec<u8>),
}

// =============================================================================
// QualifiedName
// =============================================================================

/// OPC UA qualified name (namespace index + name).
///
/// The text form is `<ns>:<name>`, or just `<name>` for namespace 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Namespace index.
    pub namespace_index: u16,

    /// The name string.
    pub name: String,
}

impl QualifiedName {
    /// Creates a new qualified name.
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }

    /// Creates a qualified name in namespace 0.
    pub fn standard(name: impl Into<String>) -> Self {
        Self::new(0, name)
    }

    /// Returns the string representation.
    pub fn to_string_with_ns(&self) -> String {
        if self.namespace_index == 0 {
            self.name.clone()
        } else {
            format!("{}:{}", self.namespace_index, self.name)
        }
    }

    /// Checks whether `self`, used as a lookup key, selects `candidate`.
    ///
    /// A key in namespace 0 matches the name in any namespace.
    pub fn matches(&self, candidate: &QualifiedName) -> bool {
        if self.namespace_index == 0 {
            self.name == candidate.name
        } else {
            self == candidate
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_ns())
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        if let Some((ns, name)) = s.split_once(':') {
            if let Ok(ns_idx) = ns.parse::<u16>() {
                return Self::new(ns_idx, name);
            }
        }
        Self::standard(s)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&QualifiedName> for QualifiedName {
    fn from(name: &QualifiedName) -> Self {
        name.clone()
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_with_ns())
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

// =============================================================================
// NodeClass
// =============================================================================

/// OPC UA node class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// Object node.
    #[default]
    Object,
    /// Variable node.
    Variable,
    /// Method node.
    Method,
    /// Object type node.
    ObjectType,
    /// Variable type node.
    VariableType,
    /// Reference type node.
    ReferenceType,
    /// Data type node.
    DataType,
    /// View node.
    View,
}

impl NodeClass {
    /// Returns the OPC UA bit mask value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Object => 1,
            Self::Variable => 2,
            Self::Method => 4,
            Self::ObjectType => 8,
            Self::VariableType => 16,
            Self::ReferenceType => 32,
            Self::DataType => 64,
            Self::View => 128,
        }
    }

    /// Creates from the OPC UA value.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Object),
            2 => Some(Self::Variable),
            4 => Some(Self::Method),
            8 => Some(Self::ObjectType),
            16 => Some(Self::VariableType),
            32 => Some(Self::ReferenceType),
            64 => Some(Self::DataType),
            128 => Some(Self::View),
            _ => None,
        }
    }

    /// Returns `true` for the type node classes a schema can describe.
    pub const fn is_type(&self) -> bool {
        matches!(self, Self::ObjectType | Self::VariableType)
    }

    /// Returns the instance node class for a type node class.
    pub const fn instance_class(&self) -> Option<Self> {
        match self {
            Self::ObjectType => Some(Self::Object),
            Self::VariableType => Some(Self::Variable),
            _ => None,
        }
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Variable => "Variable",
            Self::Method => "Method",
            Self::ObjectType => "ObjectType",
            Self::VariableType => "VariableType",
            Self::ReferenceType => "ReferenceType",
            Self::DataType => "DataType",
            Self::View => "View",
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for NodeClass {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "object" => Ok(Self::Object),
            "variable" => Ok(Self::Variable),
            "method" => Ok(Self::Method),
            "objecttype" => Ok(Self::ObjectType),
            "variabletype" => Ok(Self::VariableType),
            "referencetype" => Ok(Self::ReferenceType),
            "datatype" => Ok(Self::DataType),
            "view" => Ok(Self::View),
            _ => Err(SchemaError::invalid_type_ref(s, "Unknown node class").into()),
        }
    }
}

// =============================================================================
// AccessLevel
// =============================================================================

bitflags! {
    /// OPC UA access level bits of a Variable node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessLevel: u8 {
        /// The current value is readable.
        const CURRENT_READ = 0x01;
        /// The current value is writable.
        const CURRENT_WRITE = 0x02;
        /// Value history is readable.
        const HISTORY_READ = 0x04;
        /// Value history is writable.
        const HISTORY_WRITE = 0x08;
    }
}

impl AccessLevel {
    /// Read-only access.
    pub const READ_ONLY: Self = Self::CURRENT_READ;

    /// Read and write access to the current value.
    pub const READ_WRITE: Self = Self::CURRENT_READ.union(Self::CURRENT_WRITE);
}

// =============================================================================
// Variant
// =============================================================================

/// A default attribute value.
///
/// Covers the built-in types the model's default payloads carry; enumeration
/// values are carried as `Int32` codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value")]
pub enum Variant {
    /// No value.
    #[default]
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 32-bit IEEE 754 float.
    Float(f32),
    /// 64-bit IEEE 754 double.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Localized text (locale, text).
    LocalizedText {
        /// Locale identifier, empty for invariant.
        locale: String,
        /// The text.
        text: String,
    },
    /// Raw byte string.
    ByteString(Vec<u8>),
    /// Array of values.
    Array(Vec<Variant>),
}

impl Variant {
    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Int16(_) => "Int16",
            Self::UInt16(_) => "UInt16",
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::Int64(_) => "Int64",
            Self::UInt64(_) => "UInt64",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::LocalizedText { .. } => "LocalizedText",
            Self::ByteString(_) => "ByteString",
            Self::Array(_) => "Array",
        }
    }

    /// Returns `true` if this is the null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to read this value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to read this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(v) => Some(*v as i64),
            Self::UInt16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::UInt32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Attempts to read this value as an i32, which is how enumeration codes
    /// travel.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    /// Attempts to read this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Attempts to read this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            Self::LocalizedText { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::LocalizedText { text, .. } => write!(f, "{}", text),
            Self::ByteString(v) => write!(f, "<{} bytes>", v.len()),
            Self::Array(v) => write!(f, "[{} elements]", v.len()),
        }
    }
}

macro_rules! impl_from_for_variant {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Variant {
            fn from(v: $type) -> Self {
                Variant::$variant(v)
            }
        }
    };
}

impl_from_for_variant!(Boolean, bool);
impl_from_for_variant!(Int16, i16);
impl_from_for_variant!(UInt16, u16);
impl_from_for_variant!(Int32, i32);
impl_from_for_variant!(UInt32, u32);
impl_from_for_variant!(Int64, i64);
impl_from_for_variant!(UInt64, u64);
impl_from_for_variant!(Float, f32);
impl_from_for_variant!(Double, f64);
impl_from_for_variant!(String, String);

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.to_string())
    }
}

// =============================================================================
// Well-known Node IDs
// =============================================================================

/// Node IDs from the OPC UA base namespace that the engine refers to.
pub mod ids {
    use super::NodeId;

    /// BaseObjectType (i=58).
    pub const BASE_OBJECT_TYPE: NodeId = NodeId::numeric(0, 58);

    /// FolderType (i=61).
    pub const FOLDER_TYPE: NodeId = NodeId::numeric(0, 61);

    /// BaseVariableType (i=62).
    pub const BASE_VARIABLE_TYPE: NodeId = NodeId::numeric(0, 62);

    /// BaseDataVariableType (i=63).
    pub const BASE_DATA_VARIABLE_TYPE: NodeId = NodeId::numeric(0, 63);

    /// PropertyType (i=68).
    pub const PROPERTY_TYPE: NodeId = NodeId::numeric(0, 68);

    /// Objects folder (i=85).
    pub const OBJECTS_FOLDER: NodeId = NodeId::numeric(0, 85);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_parse_forms() {
        assert_eq!("i=68".parse::<NodeId>().unwrap(), NodeId::numeric(0, 68));
        assert_eq!(
            "ns=2;s=MotionDeviceType".parse::<NodeId>().unwrap(),
            NodeId::string(2, "MotionDeviceType")
        );
        assert_eq!(
            "ns=1;b=AQID".parse::<NodeId>().unwrap(),
            NodeId::opaque(1, vec![1, 2, 3])
        );

        let guid: NodeId = "ns=3;g=550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(guid.namespace_index, 3);
        assert!(matches!(guid.identifier, NodeIdentifier::Guid(_)));
    }

    #[test]
    fn test_node_id_parse_rejects_garbage() {
        assert!("ns=x;i=1".parse::<NodeId>().is_err());
        assert!("ns=2".parse::<NodeId>().is_err());
        assert!("q=12".parse::<NodeId>().is_err());
        assert!("i=abc".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_node_id_serde_as_string() {
        let id = NodeId::numeric(2, 1018);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ns=2;i=1018\"");

        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_looks_like_node_id() {
        assert!(NodeId::looks_like_node_id("ns=2;i=5"));
        assert!(NodeId::looks_like_node_id("i=58"));
        assert!(!NodeId::looks_like_node_id("LoadType"));
    }

    #[test]
    fn test_qualified_name_parsing() {
        let qn = QualifiedName::from("2:Mass");
        assert_eq!(qn.namespace_index, 2);
        assert_eq!(qn.name, "Mass");

        let qn = QualifiedName::from("Mass");
        assert_eq!(qn.namespace_index, 0);
        assert_eq!(qn.to_string(), "Mass");
    }

    #[test]
    fn test_qualified_name_matching() {
        let declared = QualifiedName::new(2, "FlangeLoad");

        assert!(QualifiedName::standard("FlangeLoad").matches(&declared));
        assert!(QualifiedName::new(2, "FlangeLoad").matches(&declared));
        assert!(!QualifiedName::new(3, "FlangeLoad").matches(&declared));
        assert!(!QualifiedName::standard("Flange").matches(&declared));
    }

    #[test]
    fn test_node_class_parsing() {
        assert_eq!("object_type".parse::<NodeClass>().unwrap(), NodeClass::ObjectType);
        assert_eq!("VariableType".parse::<NodeClass>().unwrap(), NodeClass::VariableType);
        assert!("widget".parse::<NodeClass>().is_err());

        assert_eq!(NodeClass::ObjectType.instance_class(), Some(NodeClass::Object));
        assert_eq!(NodeClass::Object.instance_class(), None);
    }

    #[test]
    fn test_access_level_bits() {
        let rw = AccessLevel::READ_WRITE;
        assert!(rw.contains(AccessLevel::CURRENT_READ));
        assert!(rw.contains(AccessLevel::CURRENT_WRITE));
        assert_eq!(rw.bits(), 0x03);
        assert_eq!(AccessLevel::from_bits_truncate(0xFF).bits(), 0x0F);
    }

    #[test]
    fn test_variant_accessors() {
        assert_eq!(Variant::Int32(3).as_i32(), Some(3));
        assert_eq!(Variant::Double(1.5).as_f64(), Some(1.5));
        assert_eq!(Variant::from("kg").as_str(), Some("kg"));
        assert_eq!(Variant::Boolean(true).as_bool(), Some(true));
        assert!(Variant::default().is_null());
        assert_eq!(Variant::Int64(i64::MAX).as_i32(), None);
    }

    #[test]
    fn test_variant_serde_shape() {
        let json = serde_json::to_value(Variant::Double(2.5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Double", "value": 2.5}));

        let back: Variant = serde_json::from_value(json).unwrap();
        assert_eq!(back, Variant::Double(2.5));
    }
}
