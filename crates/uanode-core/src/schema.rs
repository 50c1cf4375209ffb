// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node type schemas.
//!
//! A [`NodeTypeSchema`] is the data-driven replacement for a generated node
//! class: it names the type, its supertype, the ordered child slots an
//! instance may hold and the encoded defaults an instance starts with.
//!
//! ```text
//! NodeTypeSchema (ns=2;i=1004 MotionDeviceType)
//!   super_type: ns=1;i=15063 ComponentType
//!   defaults:   EncodedDefaults (v1)
//!   children:
//!     ├── 2:MotionDeviceCategory  -> PropertyType     mandatory
//!     ├── 2:Axes                  -> FolderType       mandatory
//!     ├── 2:PowerTrains           -> FolderType       mandatory
//!     ├── 2:FlangeLoad            -> LoadType         optional
//!     └── 2:AdditionalComponents  -> FolderType       optional
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::EncodedDefaults;
use crate::error::{ModelError, ModelResult};
use crate::types::{NodeClass, NodeId, QualifiedName};

// =============================================================================
// TypeRef
// =============================================================================

/// A reference to a node type, by NodeId or by symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    /// Reference by type NodeId.
    Id(NodeId),
    /// Reference by symbolic name.
    Name(String),
}

impl TypeRef {
    /// Parses a reference. Text in NodeId form must be a valid NodeId.
    pub fn parse(s: &str) -> ModelResult<Self> {
        let s = s.trim();
        if NodeId::looks_like_node_id(s) {
            Ok(Self::Id(s.parse()?))
        } else {
            Ok(Self::Name(s.to_string()))
        }
    }

    /// Returns the NodeId, if this is an ID reference.
    pub fn as_node_id(&self) -> Option<&NodeId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Name(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for TypeRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NodeId> for TypeRef {
    fn from(id: NodeId) -> Self {
        Self::Id(id)
    }
}

impl From<&NodeId> for TypeRef {
    fn from(id: &NodeId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<&str> for TypeRef {
    /// Text that does not parse as a NodeId is taken as a symbolic name.
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|_| Self::Name(s.to_string()))
    }
}

// =============================================================================
// ChildSlot
// =============================================================================

/// A declared child of a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSlot {
    /// Browse name of the child.
    pub browse_name: QualifiedName,

    /// Declared type of the child.
    pub child_type: NodeId,

    /// Optional children are materialized on demand only.
    pub optional: bool,

    /// Per-slot defaults applied on top of the child type's defaults.
    pub defaults: Option<EncodedDefaults>,
}

impl ChildSlot {
    /// Creates a mandatory slot.
    pub fn mandatory(browse_name: impl Into<QualifiedName>, child_type: NodeId) -> Self {
        Self {
            browse_name: browse_name.into(),
            child_type,
            optional: false,
            defaults: None,
        }
    }

    /// Creates an optional slot.
    pub fn optional(browse_name: impl Into<QualifiedName>, child_type: NodeId) -> Self {
        Self {
            optional: true,
            ..Self::mandatory(browse_name, child_type)
        }
    }

    /// Sets the per-slot defaults.
    pub fn with_defaults(mut self, defaults: EncodedDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Returns `true` if the slot is materialized eagerly.
    #[inline]
    pub fn is_mandatory(&self) -> bool {
        !self.optional
    }

    /// Returns `true` if `key` selects this slot.
    #[inline]
    pub fn matches(&self, key: &QualifiedName) -> bool {
        key.matches(&self.browse_name)
    }
}

// =============================================================================
// NodeTypeSchema
// =============================================================================

/// Schema of an ObjectType or VariableType.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTypeSchema {
    /// Type NodeId.
    pub type_id: NodeId,

    /// Symbolic name, unique within a registry.
    pub symbolic_name: String,

    /// `ObjectType` or `VariableType`.
    pub node_class: NodeClass,

    /// Supertype, if any.
    pub super_type: Option<NodeId>,

    /// Declared child slots in browse order.
    pub children: Vec<ChildSlot>,

    /// Type-level defaults.
    pub defaults: Option<EncodedDefaults>,
}

impl NodeTypeSchema {
    /// Creates an ObjectType schema.
    pub fn object_type(type_id: NodeId, symbolic_name: impl Into<String>) -> Self {
        Self::new(type_id, symbolic_name, NodeClass::ObjectType)
    }

    /// Creates a VariableType schema.
    pub fn variable_type(type_id: NodeId, symbolic_name: impl Into<String>) -> Self {
        Self::new(type_id, symbolic_name, NodeClass::VariableType)
    }

    /// Creates a schema of the given node class.
    pub fn new(type_id: NodeId, symbolic_name: impl Into<String>, node_class: NodeClass) -> Self {
        Self {
            type_id,
            symbolic_name: symbolic_name.into(),
            node_class,
            super_type: None,
            children: Vec::new(),
            defaults: None,
        }
    }

    /// Sets the supertype.
    pub fn with_super_type(mut self, super_type: NodeId) -> Self {
        self.super_type = Some(super_type);
        self
    }

    /// Appends a child slot.
    pub fn with_child(mut self, slot: ChildSlot) -> Self {
        self.children.push(slot);
        self
    }

    /// Appends a mandatory child slot.
    pub fn with_mandatory(self, browse_name: impl Into<QualifiedName>, child_type: NodeId) -> Self {
        self.with_child(ChildSlot::mandatory(browse_name, child_type))
    }

    /// Appends an optional child slot.
    pub fn with_optional(self, browse_name: impl Into<QualifiedName>, child_type: NodeId) -> Self {
        self.with_child(ChildSlot::optional(browse_name, child_type))
    }

    /// Sets the type-level defaults.
    pub fn with_defaults(mut self, defaults: EncodedDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Returns the node class of instances of this type.
    pub fn instance_class(&self) -> NodeClass {
        self.node_class.instance_class().unwrap_or(NodeClass::Object)
    }

    /// Looks up a slot declared directly on this type.
    pub fn declared_slot(&self, key: &QualifiedName) -> Option<&ChildSlot> {
        self.children.iter().find(|slot| slot.matches(key))
    }

    /// Returns the name used in log and error messages.
    pub fn display_name(&self) -> &str {
        if self.symbolic_name.is_empty() {
            "<unnamed>"
        } else {
            &self.symbolic_name
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
