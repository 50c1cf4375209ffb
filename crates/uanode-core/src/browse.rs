// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Path navigation and tree snapshots.
//!
//! - [`BrowsePath`]: a relative path of browse names, parsed from
//!   `"2:FlangeLoad/2:Mass/EngineeringUnits"` (from a motion device)
//! - [`AddressSpace::translate_browse_path`]: resolves a path from a start
//!   node, the way a TranslateBrowsePathsToNodeIds request does
//! - [`NodeSnapshot`]: a serializable copy of a subtree for diagnostics

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::NodeAttributes;
use crate::error::{ModelError, ModelResult};
use crate::node::{NodeHandle, NodeState};
use crate::space::AddressSpace;
use crate::types::{NodeId, QualifiedName};

// =============================================================================
// BrowsePath
// =============================================================================

/// A relative browse path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsePath {
    /// Path segments to follow.
    pub segments: Vec<BrowsePathSegment>,
}

impl BrowsePath {
    /// Creates a path from segments.
    pub fn new(segments: Vec<BrowsePathSegment>) -> Self {
        Self { segments }
    }

    /// Parses a `/`-separated path. Empty segments are skipped.
    pub fn from_string(path: &str) -> Self {
        let segments = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| BrowsePathSegment::new(QualifiedName::from(name)))
            .collect();
        Self { segments }
    }

    /// Returns `true` if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Appends a segment to the path.
    pub fn push(&mut self, segment: BrowsePathSegment) {
        self.segments.push(segment);
    }

    /// Returns the path as a string.
    pub fn to_path_string(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.target_name.to_string_with_ns())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for BrowsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

impl FromStr for BrowsePath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_string(s))
    }
}

impl From<&str> for BrowsePath {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

// =============================================================================
// BrowsePathSegment
// =============================================================================

/// A single segment in a browse path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsePathSegment {
    /// Target browse name to find.
    pub target_name: QualifiedName,
}

impl BrowsePathSegment {
    /// Creates a new path segment.
    pub fn new(target_name: QualifiedName) -> Self {
        Self { target_name }
    }

    /// Checks if a node matches this segment.
    pub fn matches(&self, browse_name: &QualifiedName) -> bool {
        self.target_name.matches(browse_name)
    }
}

// =============================================================================
// NodeSnapshot
// =============================================================================

/// A serializable copy of a node and its materialized subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Type definition NodeId.
    pub type_definition: NodeId,

    /// Symbolic name of the type.
    pub type_name: String,

    /// Lifecycle state.
    pub state: NodeState,

    /// Attribute values.
    pub attributes: NodeAttributes,

    /// Children in slot order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Returns the browse name.
    pub fn browse_name(&self) -> &QualifiedName {
        &self.attributes.browse_name
    }

    /// Finds a direct child by browse name.
    pub fn child(&self, name: impl Into<QualifiedName>) -> Option<&NodeSnapshot> {
        let key = name.into();
        self.children.iter().find(|c| key.matches(c.browse_name()))
    }

    /// Returns the number of nodes in this snapshot, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::node_count).sum::<usize>()
    }
}

// =============================================================================
// AddressSpace navigation
// =============================================================================

impl AddressSpace {
    /// Resolves a browse path relative to `start`.
    ///
    /// Only materialized children are followed; an empty path resolves to
    /// `start` itself.
    pub fn translate_browse_path(
        &self,
        start: NodeHandle,
        path: &BrowsePath,
    ) -> ModelResult<Option<NodeHandle>> {
        let mut current = start;
        self.node(current)?;

        for segment in &path.segments {
            match self.child(current, &segment.target_name)? {
                Some(next) => current = next,
                None => {
                    tracing::trace!(path = %path, missing = %segment.target_name, "Browse path not found");
                    return Ok(None);
                }
            }
        }

        Ok(Some(current))
    }

    /// Copies a subtree into a [`NodeSnapshot`].
    pub fn snapshot(&self, handle: NodeHandle) -> ModelResult<NodeSnapshot> {
        let node = self.node(handle)?;
        let children = self
            .children(handle)?
            .into_iter()
            .map(|child| self.snapshot(child))
            .collect::<ModelResult<Vec<_>>>()?;

        Ok(NodeSnapshot {
            type_definition: node.type_id().clone(),
            type_name: self.registry().type_name(node.type_id()),
            state: node.state(),
            attributes: node.attributes().clone(),
            children,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::NodeTypeRegistry;
    use crate::schema::NodeTypeSchema;
    use crate::types::ids;

    fn space() -> AddressSpace {
        let registry = NodeTypeRegistry::builder()
            .add_type(NodeTypeSchema::object_type(ids::BASE_OBJECT_TYPE, "BaseObjectType"))
            .add_type(
                NodeTypeSchema::object_type(ids::FOLDER_TYPE, "FolderType")
                    .with_super_type(ids::BASE_OBJECT_TYPE),
            )
            .add_type(NodeTypeSchema::variable_type(ids::PROPERTY_TYPE, "PropertyType"))
            .add_type(
                NodeTypeSchema::object_type(NodeId::numeric(1, 10), "ArmType")
                    .with_mandatory("1:Joints", ids::FOLDER_TYPE)
                    .with_optional("1:Tool", NodeId::numeric(1, 11)),
            )
            .add_type(
                NodeTypeSchema::object_type(NodeId::numeric(1, 11), "ToolType")
                    .with_mandatory("1:Weight", ids::PROPERTY_TYPE),
            )
            .build()
            .unwrap();
        AddressSpace::new(Arc::new(registry))
    }

    #[test]
    fn test_browse_path_from_string() {
        let path = BrowsePath::from_string("Arm/1:Tool//Weight");
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments[1].target_name, QualifiedName::new(1, "Tool"));
        assert_eq!(path.to_string(), "Arm/1:Tool/Weight");
        assert!(BrowsePath::from_string("").is_empty());
    }

    #[test]
    fn test_segment_matching() {
        let segment = BrowsePathSegment::new(QualifiedName::standard("Tool"));
        assert!(segment.matches(&QualifiedName::new(1, "Tool")));

        let segment = BrowsePathSegment::new(QualifiedName::new(2, "Tool"));
        assert!(!segment.matches(&QualifiedName::new(1, "Tool")));
    }

    #[test]
    fn test_translate_browse_path() {
        let mut space = space();
        let arm = space.instantiate("ArmType", "Arm").unwrap();

        let path = BrowsePath::from("Tool/Weight");
        assert_eq!(space.translate_browse_path(arm, &path).unwrap(), None);

        let tool = space.find_child(arm, "Tool", true, None).unwrap().unwrap();
        let weight = space.child(tool, "Weight").unwrap();
        assert_eq!(space.translate_browse_path(arm, &path).unwrap(), weight);
        assert_eq!(
            space.translate_browse_path(arm, &BrowsePath::default()).unwrap(),
            Some(arm)
        );
    }

    #[test]
    fn test_snapshot_tree() {
        let mut space = space();
        let arm = space.instantiate("ArmType", "Arm").unwrap();
        space.find_child(arm, "Tool", true, None).unwrap();

        let snapshot = space.snapshot(arm).unwrap();
        assert_eq!(snapshot.type_name, "ArmType");
        assert_eq!(snapshot.node_count(), 4);
        assert_eq!(snapshot.children[0].browse_name().name, "Joints");
        assert!(snapshot.child("Tool").unwrap().child("Weight").is_some());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["type_definition"], "ns=1;i=10");
        assert_eq!(json["attributes"]["browse_name"], "Arm");
        let back: NodeSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
