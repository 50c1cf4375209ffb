// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node instances and the arena that owns them.
//!
//! Nodes live in an arena and refer to each other through
//! [`NodeHandle`]s. A child holds its parent's handle without owning it; a
//! parent owns its children, so freeing a node frees its whole subtree.
//! Handles are generational: once a slot is freed and reused, old handles to
//! it stop resolving instead of aliasing the new node.

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::defaults::{EncodedDefaults, NodeAttributes};
use crate::types::{NodeId, QualifiedName, Variant};

// =============================================================================
// NodeHandle
// =============================================================================

/// Generational handle of a node in an address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    /// Returns the arena slot index.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the slot generation.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// NodeState
// =============================================================================

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeState {
    /// Created, defaults not yet applied.
    #[default]
    Uninitialized,
    /// Defaults applied and mandatory children materialized.
    Initialized,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
        }
    }
}

// =============================================================================
// ChangeMask
// =============================================================================

bitflags! {
    /// Aspects of a node changed since the last flush.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeMask: u8 {
        /// A child was added, replaced or removed.
        const CHILDREN = 0x01;
        /// A non-hierarchical reference changed.
        const REFERENCES = 0x02;
        /// A non-value attribute changed.
        const NON_VALUE = 0x04;
        /// The value changed.
        const VALUE = 0x08;
        /// The node was deleted.
        const DELETED = 0x10;
    }
}

// =============================================================================
// NodeInstance
// =============================================================================

/// A materialized node.
#[derive(Debug, Clone)]
pub struct NodeInstance {
    pub(crate) type_id: NodeId,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: HashMap<String, NodeHandle>,
    pub(crate) attributes: NodeAttributes,
    pub(crate) state: NodeState,
    pub(crate) change_mask: ChangeMask,
    pub(crate) slot_defaults: Option<EncodedDefaults>,
}

impl NodeInstance {
    pub(crate) fn new(type_id: NodeId, attributes: NodeAttributes) -> Self {
        Self {
            type_id,
            parent: None,
            children: HashMap::new(),
            attributes,
            state: NodeState::Uninitialized,
            change_mask: ChangeMask::empty(),
            slot_defaults: None,
        }
    }

    /// Returns the type of this node.
    pub fn type_id(&self) -> &NodeId {
        &self.type_id
    }

    /// Returns the parent, if attached.
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns the browse name.
    pub fn browse_name(&self) -> &QualifiedName {
        &self.attributes.browse_name
    }

    /// Returns the attributes.
    pub fn attributes(&self) -> &NodeAttributes {
        &self.attributes
    }

    /// Returns the current value.
    pub fn value(&self) -> &Variant {
        &self.attributes.value
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Returns `true` once defaults have been applied.
    pub fn is_initialized(&self) -> bool {
        self.state == NodeState::Initialized
    }

    /// Returns the pending change mask.
    pub fn change_mask(&self) -> ChangeMask {
        self.change_mask
    }

    /// Returns the number of materialized children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn child(&self, name: &str) -> Option<NodeHandle> {
        self.children.get(name).copied()
    }

    pub(crate) fn child_key_of(&self, handle: NodeHandle) -> Option<String> {
        self.children
            .iter()
            .find(|(_, child)| **child == handle)
            .map(|(name, _)| name.clone())
    }
}

// =============================================================================
// NodeArena
// =============================================================================

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    node: Option<NodeInstance>,
}

/// Slot storage for nodes with a free list.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    live: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: NodeInstance) -> NodeHandle {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.node = Some(node);
            return NodeHandle {
                index,
                generation: entry.generation,
            };
        }

        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            node: Some(node),
        });
        NodeHandle {
            index,
            generation: 0,
        }
    }

    /// Frees one node. Its children are not touched.
    pub(crate) fn remove(&mut self, handle: NodeHandle) -> Option<NodeInstance> {
        let entry = self.entries.get_mut(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(node)
    }

    pub(crate) fn get(&self, handle: NodeHandle) -> Option<&NodeInstance> {
        self.entries
            .get(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut NodeInstance> {
        self.entries
            .get_mut(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)
            .and_then(|entry| entry.node.as_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

// =============================================================================
// Tests
// =============================================================================
