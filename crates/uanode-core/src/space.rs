// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The address space: node trees materialized from the type registry.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        AddressSpace                          │
//! │  create_node / instantiate / initialize                      │
//! │  children / child / find_child / set_child / remove_subtree  │
//! │  set_value / set_display_name / clear_change_masks           │
//! └──────────────────────────────────────────────────────────────┘
//!          │                      │                     │
//!          ▼                      ▼                     ▼
//!  Arc<NodeTypeRegistry>   Arc<dyn DefaultsDecoder>  node arena
//!  (slot tables)           (payload -> attributes)   (NodeInstance)
//! ```
//!
//! Every per-type behavior a generated node class would hand-write is driven
//! here by the registry's effective slot table: which children exist, in what
//! order, which are materialized eagerly and what type a replacement must
//! have.
//!
//! # Concurrency
//!
//! There is no internal locking. Mutating operations take `&mut self` and
//! browse operations take `&self`; a host that serves browse requests from
//! several threads wraps the space in its own lock.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use uanode_core::{AddressSpace, NodeTypeRegistry, NodeTypeSchema};
//! use uanode_core::types::{ids, NodeId};
//!
//! let registry = NodeTypeRegistry::builder()
//!     .add_type(NodeTypeSchema::object_type(ids::BASE_OBJECT_TYPE, "BaseObjectType"))
//!     .add_type(
//!         NodeTypeSchema::object_type(ids::FOLDER_TYPE, "FolderType")
//!             .with_super_type(ids::BASE_OBJECT_TYPE),
//!     )
//!     .add_type(
//!         NodeTypeSchema::object_type(NodeId::numeric(1, 1), "CellType")
//!             .with_mandatory("Stations", ids::FOLDER_TYPE)
//!             .with_optional("Spares", ids::FOLDER_TYPE),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut space = AddressSpace::new(Arc::new(registry));
//! let cell = space.instantiate("CellType", "Cell1").unwrap();
//!
//! assert_eq!(space.children(cell).unwrap().len(), 1);
//! let spares = space.find_child(cell, "Spares", true, None).unwrap();
//! assert!(spares.is_some());
//! assert_eq!(space.children(cell).unwrap().len(), 2);
//! ```

use std::sync::Arc;

use crate::defaults::{Base64JsonDecoder, DefaultsDecoder, NodeAttributes};
use crate::error::{InstanceError, ModelError, ModelResult};
use crate::node::{ChangeMask, NodeArena, NodeHandle, NodeInstance, NodeState};
use crate::registry::NodeTypeRegistry;
use crate::schema::{ChildSlot, TypeRef};
use crate::types::{NodeId, QualifiedName, Variant};

// =============================================================================
// ChangeListener
// =============================================================================

/// Receives pending change masks when they are flushed.
pub trait ChangeListener {
    /// Called once per node with a non-empty mask, parents before children.
    fn on_change(&mut self, handle: NodeHandle, node: &NodeInstance, mask: ChangeMask);
}

/// A flushed change, as collected by the `Vec` listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The changed node.
    pub handle: NodeHandle,
    /// Its browse name.
    pub browse_name: QualifiedName,
    /// What changed.
    pub mask: ChangeMask,
}

/// Discards all changes.
impl ChangeListener for () {
    fn on_change(&mut self, _handle: NodeHandle, _node: &NodeInstance, _mask: ChangeMask) {}
}

impl ChangeListener for Vec<ChangeEvent> {
    fn on_change(&mut self, handle: NodeHandle, node: &NodeInstance, mask: ChangeMask) {
        self.push(ChangeEvent {
            handle,
            browse_name: node.browse_name().clone(),
            mask,
        });
    }
}

// =============================================================================
// AddressSpace
// =============================================================================

/// Nodes an `initialize` call created or modified, for rollback.
#[derive(Debug, Default)]
struct InitJournal {
    created: Vec<NodeHandle>,
    touched: Vec<(NodeHandle, NodeInstance)>,
}

/// Arena of node trees built from a [`NodeTypeRegistry`](crate::NodeTypeRegistry).
#[derive(Debug)]
pub struct AddressSpace {
    registry: Arc<NodeTypeRegistry>,
    decoder: Arc<dyn DefaultsDecoder>,
    arena: NodeArena,
}

impl AddressSpace {
    /// Creates an empty address space using [`Base64JsonDecoder`].
    pub fn new(registry: Arc<NodeTypeRegistry>) -> Self {
        Self::with_decoder(registry, Arc::new(Base64JsonDecoder::new()))
    }

    /// Creates an empty address space with a host-supplied decoder.
    pub fn with_decoder(
        registry: Arc<NodeTypeRegistry>,
        decoder: Arc<dyn DefaultsDecoder>,
    ) -> Self {
        Self {
            registry,
            decoder,
            arena: NodeArena::new(),
        }
    }

    /// Returns the type registry.
    pub fn registry(&self) -> &Arc<NodeTypeRegistry> {
        &self.registry
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the space holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Returns `true` if the handle refers to a live node.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.arena.get(handle).is_some()
    }

    /// Returns a node.
    pub fn node(&self, handle: NodeHandle) -> ModelResult<&NodeInstance> {
        self.arena
            .get(handle)
            .ok_or_else(|| ModelError::node_not_found(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> ModelResult<&mut NodeInstance> {
        self.arena
            .get_mut(handle)
            .ok_or_else(|| ModelError::node_not_found(handle))
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates a detached, uninitialized node.
    ///
    /// Only the browse name (and the display name derived from it) is set;
    /// call [`initialize`](Self::initialize) to apply the type's defaults.
    pub fn create_node(
        &mut self,
        type_ref: impl Into<TypeRef>,
        browse_name: impl Into<QualifiedName>,
    ) -> ModelResult<NodeHandle> {
        let type_ref = type_ref.into();
        let schema = self.registry.resolve(&type_ref)?;
        let attributes = NodeAttributes::new(browse_name.into(), schema.instance_class());
        let handle = self
            .arena
            .insert(NodeInstance::new(schema.type_id.clone(), attributes));

        tracing::trace!(handle = %handle, type_name = schema.display_name(), "Node created");
        Ok(handle)
    }

    /// Creates and initializes a detached node.
    pub fn instantiate(
        &mut self,
        type_ref: impl Into<TypeRef>,
        browse_name: impl Into<QualifiedName>,
    ) -> ModelResult<NodeHandle> {
        let handle = self.create_node(type_ref, browse_name)?;
        if let Err(e) = self.initialize(handle) {
            self.arena.remove(handle);
            return Err(e);
        }
        Ok(handle)
    }

    /// Applies defaults and materializes the mandatory children of a node.
    ///
    /// The type's payload is decoded first, then the payload of the slot the
    /// node was created for, if any. Every mandatory slot that is not yet
    /// materialized gets a child, recursively initialized. A mandatory child
    /// installed with [`set_child`](Self::set_child) before initialization
    /// is kept and initialized in place if it is still uninitialized.
    /// Optional slots are left alone.
    ///
    /// Calling this on an initialized node does nothing. On failure, every
    /// node created by the call is freed, every pre-existing node it touched
    /// is restored, and the node stays uninitialized.
    pub fn initialize(&mut self, handle: NodeHandle) -> ModelResult<()> {
        if self.node(handle)?.is_initialized() {
            tracing::trace!(handle = %handle, "Node already initialized");
            return Ok(());
        }

        let mut journal = InitJournal::default();
        if let Err(e) = self.initialize_node(handle, &mut journal) {
            let rolled_back = journal.created.len();
            for node in journal.created {
                self.arena.remove(node);
            }
            for (node, previous) in journal.touched.into_iter().rev() {
                if let Some(slot) = self.arena.get_mut(node) {
                    *slot = previous;
                }
            }
            tracing::warn!(
                handle = %handle,
                rolled_back,
                error = %e,
                "Node initialization failed"
            );
            return Err(e);
        }

        tracing::debug!(handle = %handle, created = journal.created.len(), "Node initialized");
        Ok(())
    }

    fn initialize_node(&mut self, handle: NodeHandle, journal: &mut InitJournal) -> ModelResult<()> {
        let registry = Arc::clone(&self.registry);
        let (type_id, mut attributes, slot_defaults) = {
            let node = self.node(handle)?;
            (
                node.type_id.clone(),
                node.attributes.clone(),
                node.slot_defaults.clone(),
            )
        };

        let schema = registry.get(&type_id)?;
        if let Some(ref defaults) = schema.defaults {
            attributes.apply(&self.decoder.decode(defaults)?);
        }
        if let Some(ref defaults) = slot_defaults {
            attributes.apply(&self.decoder.decode(defaults)?);
        }

        let mut new_children = Vec::new();
        for slot in registry.effective_slots(&type_id)?.iter().filter(|s| s.is_mandatory()) {
            if let Some(existing) = self.node(handle)?.child(&slot.browse_name.name) {
                let node = self.node(existing)?;
                if !node.is_initialized() {
                    journal.touched.push((existing, node.clone()));
                    let node = self.node_mut(existing)?;
                    if node.slot_defaults.is_none() {
                        node.slot_defaults = slot.defaults.clone();
                    }
                    self.initialize_node(existing, journal)?;
                }
                continue;
            }
            let child = self.create_slot_child(slot)?;
            journal.created.push(child);
            self.initialize_node(child, journal)?;
            new_children.push((slot.browse_name.name.clone(), child));
        }

        for &(_, child) in &new_children {
            self.node_mut(child)?.parent = Some(handle);
        }

        let node = self.node_mut(handle)?;
        node.attributes = attributes;
        node.state = NodeState::Initialized;
        node.slot_defaults = None;
        node.children.extend(new_children);
        Ok(())
    }

    fn create_slot_child(&mut self, slot: &ChildSlot) -> ModelResult<NodeHandle> {
        let schema = self.registry.get(&slot.child_type)?;
        let attributes = NodeAttributes::new(slot.browse_name.clone(), schema.instance_class());
        let mut node = NodeInstance::new(schema.type_id.clone(), attributes);
        node.slot_defaults = slot.defaults.clone();
        Ok(self.arena.insert(node))
    }

    fn materialize_slot(&mut self, slot: &ChildSlot) -> ModelResult<NodeHandle> {
        let child = self.create_slot_child(slot)?;
        if let Err(e) = self.initialize(child) {
            self.arena.remove(child);
            return Err(e);
        }
        Ok(child)
    }

    // =========================================================================
    // Browse
    // =========================================================================

    /// Returns the materialized children in slot order.
    ///
    /// Optional slots that were never materialized are skipped.
    pub fn children(&self, handle: NodeHandle) -> ModelResult<Vec<NodeHandle>> {
        let node = self.node(handle)?;
        let slots = self.registry.effective_slots(&node.type_id)?;
        Ok(slots
            .iter()
            .filter_map(|slot| node.child(&slot.browse_name.name))
            .collect())
    }

    /// Looks up a materialized child without creating anything.
    pub fn child(
        &self,
        handle: NodeHandle,
        browse_name: impl Into<QualifiedName>,
    ) -> ModelResult<Option<NodeHandle>> {
        let key = browse_name.into();
        let node = self.node(handle)?;
        Ok(self
            .registry
            .find_slot(&node.type_id, &key)?
            .and_then(|slot| node.child(&slot.browse_name.name)))
    }

    /// Looks up, creates or replaces a child.
    ///
    /// | slot declared | materialized | `create_or_replace` | `replacement` | result            |
    /// |---------------|--------------|---------------------|---------------|-------------------|
    /// | no            | -            | -                   | -             | `None`            |
    /// | yes           | yes          | `false`             | -             | existing child    |
    /// | yes           | no           | `false`             | -             | `None`            |
    /// | yes           | no           | `true`              | `None`        | new default child |
    /// | yes           | yes          | `true`              | `None`        | existing child    |
    /// | yes           | -            | `true`              | `Some(h)`     | `h`, installed    |
    ///
    /// Installing goes through [`set_child`](Self::set_child), so the parent's
    /// `CHILDREN` bit is raised only when the child reference changes.
    pub fn find_child(
        &mut self,
        handle: NodeHandle,
        browse_name: impl Into<QualifiedName>,
        create_or_replace: bool,
        replacement: Option<NodeHandle>,
    ) -> ModelResult<Option<NodeHandle>> {
        let key = browse_name.into();
        let registry = Arc::clone(&self.registry);
        let node = self.node(handle)?;

        let Some(slot) = registry.find_slot(&node.type_id, &key)? else {
            tracing::trace!(handle = %handle, browse_name = %key, "Browse name not declared");
            return Ok(None);
        };
        let existing = node.child(&slot.browse_name.name);

        if !create_or_replace {
            return Ok(existing);
        }

        match (replacement, existing) {
            (Some(replacement), _) => {
                self.install_child(handle, slot, Some(replacement))?;
                Ok(Some(replacement))
            }
            (None, Some(existing)) => Ok(Some(existing)),
            (None, None) => {
                let child = self.materialize_slot(slot)?;
                if let Err(e) = self.install_child(handle, slot, Some(child)) {
                    self.free_subtree(child);
                    return Err(e);
                }
                tracing::debug!(
                    parent = %handle,
                    child = %child,
                    browse_name = %slot.browse_name,
                    "Optional child materialized"
                );
                Ok(Some(child))
            }
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Sets or clears the child in a declared slot.
    ///
    /// Returns `false` without touching the change mask when the slot already
    /// holds `child`. Otherwise the previous child's subtree is freed, `child`
    /// is attached and `CHILDREN` is raised on the parent.
    ///
    /// `child` must be of the slot type or a subtype, detached, and not an
    /// ancestor of `handle`.
    pub fn set_child(
        &mut self,
        handle: NodeHandle,
        browse_name: impl Into<QualifiedName>,
        child: Option<NodeHandle>,
    ) -> ModelResult<bool> {
        let key = browse_name.into();
        let registry = Arc::clone(&self.registry);
        let type_id = self.node(handle)?.type_id.clone();

        let slot = registry.find_slot(&type_id, &key)?.ok_or_else(|| {
            ModelError::from(InstanceError::NoSuchSlot {
                type_name: registry.type_name(&type_id),
                browse_name: key.to_string(),
            })
        })?;

        self.install_child(handle, slot, child)
    }

    fn install_child(
        &mut self,
        handle: NodeHandle,
        slot: &ChildSlot,
        child: Option<NodeHandle>,
    ) -> ModelResult<bool> {
        let current = self.node(handle)?.child(&slot.browse_name.name);
        if current == child {
            return Ok(false);
        }

        if let Some(new_child) = child {
            self.check_replacement(handle, slot, new_child)?;
        }
        if let Some(old_child) = current {
            self.free_subtree(old_child);
        }

        if let Some(new_child) = child {
            let node = self.node_mut(new_child)?;
            node.parent = Some(handle);
            node.attributes.browse_name = slot.browse_name.clone();
        }

        let name = slot.browse_name.name.clone();
        let parent = self.node_mut(handle)?;
        match child {
            Some(new_child) => {
                parent.children.insert(name, new_child);
            }
            None => {
                parent.children.remove(&name);
            }
        }
        parent.change_mask |= ChangeMask::CHILDREN;

        tracing::debug!(
            parent = %handle,
            browse_name = %slot.browse_name,
            replaced = current.is_some(),
            "Child reference changed"
        );
        Ok(true)
    }

    fn check_replacement(&self, handle: NodeHandle, slot: &ChildSlot, child: NodeHandle) -> ModelResult<()> {
        let node = self.node(child)?;

        if !self.registry.is_subtype_of(&node.type_id, &slot.child_type) {
            let error = InstanceError::type_mismatch(
                slot.browse_name.to_string(),
                self.registry.type_name(&slot.child_type),
                self.registry.type_name(&node.type_id),
            );
            tracing::warn!(parent = %handle, child = %child, "{}", error);
            return Err(error.into());
        }

        let mut cursor = Some(handle);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(InstanceError::CyclicAttachment {
                    browse_name: slot.browse_name.to_string(),
                    handle: child.to_string(),
                }
                .into());
            }
            cursor = self.node(ancestor)?.parent;
        }

        if node.parent.is_some() {
            return Err(InstanceError::AlreadyAttached {
                browse_name: slot.browse_name.to_string(),
                handle: child.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Sets the value of a node. Raises `VALUE` only if the value changed.
    pub fn set_value(&mut self, handle: NodeHandle, value: impl Into<Variant>) -> ModelResult<bool> {
        let value = value.into();
        let node = self.node_mut(handle)?;
        if node.attributes.value == value {
            return Ok(false);
        }
        node.attributes.value = value;
        node.change_mask |= ChangeMask::VALUE;
        Ok(true)
    }

    /// Sets the display name of a node. Raises `NON_VALUE` only on change.
    pub fn set_display_name(&mut self, handle: NodeHandle, text: impl Into<String>) -> ModelResult<bool> {
        let text = text.into();
        let node = self.node_mut(handle)?;
        if node.attributes.display_name == text {
            return Ok(false);
        }
        node.attributes.display_name = text;
        node.change_mask |= ChangeMask::NON_VALUE;
        Ok(true)
    }

    /// Detaches a node from its parent and frees its whole subtree.
    ///
    /// Every freed node is reported to `listener` with `DELETED` added to its
    /// pending mask, parents first. The former parent gets `CHILDREN`.
    /// Returns the number of freed nodes.
    pub fn remove_subtree(
        &mut self,
        handle: NodeHandle,
        listener: &mut dyn ChangeListener,
    ) -> ModelResult<usize> {
        let order = self.collect_subtree(handle)?;

        let parent = self.node(handle)?.parent;
        if let Some(parent) = parent {
            let parent_node = self.node_mut(parent)?;
            if let Some(key) = parent_node.child_key_of(handle) {
                parent_node.children.remove(&key);
            }
            parent_node.change_mask |= ChangeMask::CHILDREN;
        }

        for &node_handle in &order {
            if let Some(node) = self.arena.get(node_handle) {
                listener.on_change(node_handle, node, node.change_mask | ChangeMask::DELETED);
            }
        }
        for &node_handle in &order {
            self.arena.remove(node_handle);
        }

        tracing::debug!(handle = %handle, removed = order.len(), "Subtree removed");
        Ok(order.len())
    }

    /// Frees a subtree without touching its parent.
    fn free_subtree(&mut self, handle: NodeHandle) -> usize {
        let mut stack = vec![handle];
        let mut freed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.children.into_values());
                freed += 1;
            }
        }
        freed
    }

    // =========================================================================
    // Change masks
    // =========================================================================

    /// Reports and clears pending change masks.
    ///
    /// Walks the subtree depth-first in slot order when `include_children`
    /// is set, otherwise only the node itself.
    pub fn clear_change_masks(
        &mut self,
        handle: NodeHandle,
        include_children: bool,
        listener: &mut dyn ChangeListener,
    ) -> ModelResult<()> {
        let order = if include_children {
            self.collect_subtree(handle)?
        } else {
            self.node(handle)?;
            vec![handle]
        };

        for node_handle in order {
            if let Some(node) = self.arena.get_mut(node_handle) {
                let mask = node.change_mask;
                if !mask.is_empty() {
                    node.change_mask = ChangeMask::empty();
                    listener.on_change(node_handle, node, mask);
                }
            }
        }
        Ok(())
    }

    /// Returns a subtree in pre-order, children in slot order.
    pub fn collect_subtree(&self, handle: NodeHandle) -> ModelResult<Vec<NodeHandle>> {
        let mut order = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let children = self.children(current)?;
            order.push(current);
            stack.extend(children.into_iter().rev());
        }
        Ok(order)
    }

    // =========================================================================
    // Attribute access
    // =========================================================================

    /// Returns the attributes of a node.
    pub fn attributes(&self, handle: NodeHandle) -> ModelResult<&NodeAttributes> {
        Ok(&self.node(handle)?.attributes)
    }

    /// Returns the value of a node.
    pub fn value(&self, handle: NodeHandle) -> ModelResult<&Variant> {
        Ok(&self.node(handle)?.attributes.value)
    }

    /// Returns the browse name of a node.
    pub fn browse_name(&self, handle: NodeHandle) -> ModelResult<&QualifiedName> {
        Ok(&self.node(handle)?.attributes.browse_name)
    }

    /// Returns the type of a node.
    pub fn type_id(&self, handle: NodeHandle) -> ModelResult<&NodeId> {
        Ok(&self.node(handle)?.type_id)
    }

    /// Returns the parent of a node.
    pub fn parent(&self, handle: NodeHandle) -> ModelResult<Option<NodeHandle>> {
        Ok(self.node(handle)?.parent)
    }

    /// Returns the lifecycle state of a node.
    pub fn state(&self, handle: NodeHandle) -> ModelResult<NodeState> {
        Ok(self.node(handle)?.state)
    }

    /// Returns the pending change mask of a node.
    pub fn change_mask(&self, handle: NodeHandle) -> ModelResult<ChangeMask> {
        Ok(self.node(handle)?.change_mask)
    }
}

// =============================================================================
// Tests
// =============================================================================
