// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node type registry.
//!
//! The registry is built once from a model description and is read-only
//! afterwards. Building validates the whole model so that nothing the engine
//! does later can trip over a dangling reference:
//!
//! - type IDs and symbolic names are unique
//! - every supertype and child type is registered
//! - declared browse names are unique per type
//! - supertype chains are acyclic
//! - inherited children are only overridden compatibly
//! - mandatory children never form a cycle
//!
//! # Effective slots
//!
//! A type's effective slot list is its supertype's effective list followed by
//! its own declared slots. A declared slot whose browse name matches an
//! inherited one overrides it in place, keeping the inherited position.
//!
//! ```text
//! BaseObjectType          []
//! TopologyElementType     [ParameterSet?]
//! ComponentType           [ParameterSet?, Manufacturer?, Model?, ...]
//! MotionDeviceType        [ParameterSet?, Manufacturer, Model, ..., Axes, PowerTrains, FlangeLoad?]
//! ```

use std::collections::HashMap;

use crate::error::{ModelResult, SchemaError};
use crate::schema::{ChildSlot, NodeTypeSchema, TypeRef};
use crate::types::{NodeId, QualifiedName};

/// URI of namespace 0.
pub const UA_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

// =============================================================================
// NodeTypeRegistry
// =============================================================================

/// Immutable, validated set of node type schemas.
#[derive(Debug, Clone)]
pub struct NodeTypeRegistry {
    namespaces: Vec<String>,
    types: Vec<NodeTypeSchema>,
    effective: Vec<Vec<ChildSlot>>,
    by_id: HashMap<NodeId, usize>,
    by_name: HashMap<String, usize>,
}

impl NodeTypeRegistry {
    /// Creates a registry builder.
    pub fn builder() -> NodeTypeRegistryBuilder {
        NodeTypeRegistryBuilder::new()
    }

    /// Returns the schema of a type.
    pub fn get(&self, type_id: &NodeId) -> ModelResult<&NodeTypeSchema> {
        self.index_of(type_id).map(|idx| &self.types[idx])
    }

    /// Returns the schema with the given symbolic name.
    pub fn get_by_name(&self, symbolic_name: &str) -> ModelResult<&NodeTypeSchema> {
        self.by_name
            .get(symbolic_name)
            .map(|&idx| &self.types[idx])
            .ok_or_else(|| SchemaError::unknown_type(symbolic_name).into())
    }

    /// Resolves a type reference.
    pub fn resolve(&self, type_ref: &TypeRef) -> ModelResult<&NodeTypeSchema> {
        match type_ref {
            TypeRef::Id(id) => self.get(id),
            TypeRef::Name(name) => self.get_by_name(name),
        }
    }

    /// Returns `true` if the type is registered.
    pub fn contains(&self, type_id: &NodeId) -> bool {
        self.by_id.contains_key(type_id)
    }

    /// Returns the effective child slots of a type, inherited slots first.
    pub fn effective_slots(&self, type_id: &NodeId) -> ModelResult<&[ChildSlot]> {
        self.index_of(type_id).map(|idx| self.effective[idx].as_slice())
    }

    /// Looks up an effective slot by browse name.
    ///
    /// A key in namespace 0 matches the name in any namespace.
    pub fn find_slot(&self, type_id: &NodeId, key: &QualifiedName) -> ModelResult<Option<&ChildSlot>> {
        Ok(self
            .effective_slots(type_id)?
            .iter()
            .find(|slot| slot.matches(key)))
    }

    /// Returns `true` if `sub` is `base` or derives from it.
    pub fn is_subtype_of(&self, sub: &NodeId, base: &NodeId) -> bool {
        derives_from(&self.types, &self.by_id, sub, base)
    }

    /// Returns the supertype chain of a type, starting with the type itself.
    pub fn type_hierarchy(&self, type_id: &NodeId) -> ModelResult<Vec<&NodeTypeSchema>> {
        let mut chain = Vec::new();
        let mut current = Some(self.get(type_id)?);
        while let Some(schema) = current {
            chain.push(schema);
            current = match schema.super_type {
                Some(ref super_type) => Some(self.get(super_type)?),
                None => None,
            };
        }
        Ok(chain)
    }

    /// Returns a human-readable name for a type, for messages.
    pub fn type_name(&self, type_id: &NodeId) -> String {
        match self.get(type_id) {
            Ok(schema) => schema.display_name().to_string(),
            Err(_) => type_id.to_string(),
        }
    }

    /// Returns the namespace URI table. Index 0 is the base namespace.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Returns the index of a namespace URI.
    pub fn namespace_index(&self, uri: &str) -> Option<u16> {
        self.namespaces
            .iter()
            .position(|ns| ns == uri)
            .and_then(|idx| u16::try_from(idx).ok())
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over the schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeTypeSchema> {
        self.types.iter()
    }

    fn index_of(&self, type_id: &NodeId) -> ModelResult<usize> {
        self.by_id
            .get(type_id)
            .copied()
            .ok_or_else(|| SchemaError::unknown_type(type_id.to_string()).into())
    }
}

// =============================================================================
// NodeTypeRegistryBuilder
// =============================================================================

/// Builder for [`NodeTypeRegistry`].
#[derive(Debug, Clone)]
pub struct NodeTypeRegistryBuilder {
    namespaces: Vec<String>,
    types: Vec<NodeTypeSchema>,
}

impl Default for NodeTypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTypeRegistryBuilder {
    /// Creates a builder with only the base namespace.
    pub fn new() -> Self {
        Self {
            namespaces: vec![UA_NAMESPACE_URI.to_string()],
            types: Vec::new(),
        }
    }

    /// Registers a namespace URI. Already registered URIs are ignored.
    pub fn namespace(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        if !self.namespaces.contains(&uri) {
            self.namespaces.push(uri);
        }
        self
    }

    /// Adds a type schema.
    pub fn add_type(mut self, schema: NodeTypeSchema) -> Self {
        self.types.push(schema);
        self
    }

    /// Adds several type schemas.
    pub fn add_types(mut self, schemas: impl IntoIterator<Item = NodeTypeSchema>) -> Self {
        self.types.extend(schemas);
        self
    }

    /// Returns the number of types added so far.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Validates the model and builds the registry.
    pub fn build(self) -> ModelResult<NodeTypeRegistry> {
        let Self { namespaces, types } = self;

        let mut by_id = HashMap::with_capacity(types.len());
        let mut by_name = HashMap::with_capacity(types.len());
        for (idx, schema) in types.iter().enumerate() {
            if !schema.node_class.is_type() {
                return Err(SchemaError::invalid_type_ref(
                    schema.type_id.to_string(),
                    format!("node class {} is not a type node class", schema.node_class),
                )
                .into());
            }
            if by_id.insert(schema.type_id.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateType {
                    type_id: schema.type_id.to_string(),
                }
                .into());
            }
            if by_name.insert(schema.symbolic_name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateSymbolicName {
                    name: schema.symbolic_name.clone(),
                }
                .into());
            }
        }

        for schema in &types {
            check_references(schema, &by_id)?;
        }
        check_supertype_chains(&types, &by_id)?;

        let effective = compute_effective_slots(&types, &by_id)?;
        check_mandatory_cycles(&types, &by_id, &effective)?;

        tracing::debug!(
            types = types.len(),
            namespaces = namespaces.len(),
            "Node type registry built"
        );

        Ok(NodeTypeRegistry {
            namespaces,
            types,
            effective,
            by_id,
            by_name,
        })
    }
}

// =============================================================================
// Validation
// =============================================================================

fn check_references(schema: &NodeTypeSchema, by_id: &HashMap<NodeId, usize>) -> ModelResult<()> {
    if let Some(ref super_type) = schema.super_type {
        if !by_id.contains_key(super_type) {
            return Err(SchemaError::unknown_type(super_type.to_string()).into());
        }
    }

    for (pos, slot) in schema.children.iter().enumerate() {
        if !by_id.contains_key(&slot.child_type) {
            return Err(SchemaError::unknown_type(slot.child_type.to_string()).into());
        }
        let duplicated = schema.children[..pos]
            .iter()
            .any(|earlier| earlier.browse_name.name == slot.browse_name.name);
        if duplicated {
            return Err(SchemaError::duplicate_browse_name(
                schema.display_name(),
                slot.browse_name.to_string(),
            )
            .into());
        }
    }

    Ok(())
}

fn check_supertype_chains(types: &[NodeTypeSchema], by_id: &HashMap<NodeId, usize>) -> ModelResult<()> {
    for schema in types {
        let mut current = schema.super_type.as_ref();
        let mut steps = 0usize;
        while let Some(super_type) = current {
            steps += 1;
            if steps > types.len() {
                return Err(SchemaError::CyclicSupertype {
                    type_name: schema.display_name().to_string(),
                }
                .into());
            }
            current = by_id
                .get(super_type)
                .and_then(|&idx| types[idx].super_type.as_ref());
        }
    }
    Ok(())
}

/// Walks the supertype chain of `sub` looking for `base`.
fn derives_from(
    types: &[NodeTypeSchema],
    by_id: &HashMap<NodeId, usize>,
    sub: &NodeId,
    base: &NodeId,
) -> bool {
    let mut current = Some(sub);
    let mut steps = 0usize;
    while let Some(id) = current {
        if id == base {
            return true;
        }
        steps += 1;
        if steps > types.len() {
            return false;
        }
        current = by_id.get(id).and_then(|&idx| types[idx].super_type.as_ref());
    }
    false
}

fn compute_effective_slots(
    types: &[NodeTypeSchema],
    by_id: &HashMap<NodeId, usize>,
) -> ModelResult<Vec<Vec<ChildSlot>>> {
    let mut effective: Vec<Option<Vec<ChildSlot>>> = vec![None; types.len()];

    for start in 0..types.len() {
        // Collect the not yet computed part of the chain, then fill it root first.
        let mut pending = Vec::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            if effective[idx].is_some() {
                break;
            }
            pending.push(idx);
            current = types[idx]
                .super_type
                .as_ref()
                .and_then(|super_type| by_id.get(super_type).copied());
        }

        for &idx in pending.iter().rev() {
            let schema = &types[idx];
            let mut slots = match schema.super_type.as_ref().and_then(|s| by_id.get(s)) {
                Some(&super_idx) => effective[super_idx].clone().unwrap_or_default(),
                None => Vec::new(),
            };

            for declared in &schema.children {
                match slots
                    .iter()
                    .position(|inherited| inherited.browse_name.name == declared.browse_name.name)
                {
                    Some(pos) => {
                        let merged = override_slot(types, by_id, schema, &slots[pos], declared)?;
                        slots[pos] = merged;
                    }
                    None => slots.push(declared.clone()),
                }
            }

            effective[idx] = Some(slots);
        }
    }

    Ok(effective.into_iter().map(Option::unwrap_or_default).collect())
}

fn override_slot(
    types: &[NodeTypeSchema],
    by_id: &HashMap<NodeId, usize>,
    schema: &NodeTypeSchema,
    inherited: &ChildSlot,
    declared: &ChildSlot,
) -> ModelResult<ChildSlot> {
    if !derives_from(types, by_id, &declared.child_type, &inherited.child_type) {
        return Err(SchemaError::invalid_override(
            schema.display_name(),
            declared.browse_name.to_string(),
            format!(
                "{} does not derive from the inherited type {}",
                declared.child_type, inherited.child_type
            ),
        )
        .into());
    }
    if inherited.is_mandatory() && declared.optional {
        return Err(SchemaError::invalid_override(
            schema.display_name(),
            declared.browse_name.to_string(),
            "an inherited mandatory child cannot become optional",
        )
        .into());
    }

    let mut merged = declared.clone();
    if merged.defaults.is_none() {
        merged.defaults = inherited.defaults.clone();
    }
    Ok(merged)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

fn check_mandatory_cycles(
    types: &[NodeTypeSchema],
    by_id: &HashMap<NodeId, usize>,
    effective: &[Vec<ChildSlot>],
) -> ModelResult<()> {
    let mut marks = vec![Visit::New; types.len()];
    let mut path = Vec::new();

    for idx in 0..types.len() {
        if marks[idx] == Visit::New {
            visit_mandatory(idx, types, by_id, effective, &mut marks, &mut path)?;
        }
    }
    Ok(())
}

fn visit_mandatory(
    idx: usize,
    types: &[NodeTypeSchema],
    by_id: &HashMap<NodeId, usize>,
    effective: &[Vec<ChildSlot>],
    marks: &mut [Visit],
    path: &mut Vec<String>,
) -> ModelResult<()> {
    marks[idx] = Visit::Active;

    for slot in effective[idx].iter().filter(|slot| slot.is_mandatory()) {
        let Some(&child_idx) = by_id.get(&slot.child_type) else {
            continue;
        };
        path.push(format!("{}.{}", types[idx].display_name(), slot.browse_name.name));

        match marks[child_idx] {
            Visit::Active => {
                return Err(SchemaError::MandatoryCycle {
                    path: path.join(" -> "),
                }
                .into());
            }
            Visit::New => visit_mandatory(child_idx, types, by_id, effective, marks, path)?,
            Visit::Done => {}
        }

        path.pop();
    }

    marks[idx] = Visit::Done;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
