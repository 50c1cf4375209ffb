// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed OPC UA address-space node model.
//!
//! Node types are described by data: a [`NodeTypeRegistry`] of
//! [`NodeTypeSchema`]s, each with ordered child slots and an encoded default
//! payload. One generic engine, [`AddressSpace`], materializes node trees
//! from those schemas and exposes them to a host OPC UA stack.
//!
//! # Features
//!
//! - Type registry with supertype inheritance and model validation
//! - Eager mandatory children, lazy optional children
//! - Browse-name lookup with create-or-replace semantics
//! - Precise change masks: raised on actual changes only
//! - Opaque, versioned default payloads decoded through a host decoder
//! - Integer-backed enumerations that reject undeclared codes
//!
//! # Error Handling
//!
//! ```text
//! ModelError
//! ├── Schema       - Unknown types and invalid models
//! ├── Instance     - Type mismatches and stale handles
//! ├── Enumeration  - Undeclared enumeration codes
//! └── Defaults     - Unreadable default payloads
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use uanode_core::{AddressSpace, ChildSlot, NodeTypeRegistry, NodeTypeSchema};
//! use uanode_core::types::{ids, NodeId};
//!
//! let load_type = NodeId::numeric(1, 1018);
//! let registry = NodeTypeRegistry::builder()
//!     .namespace("http://opcfoundation.org/UA/Robotics/")
//!     .add_type(NodeTypeSchema::object_type(ids::BASE_OBJECT_TYPE, "BaseObjectType"))
//!     .add_type(NodeTypeSchema::variable_type(ids::PROPERTY_TYPE, "PropertyType"))
//!     .add_type(
//!         NodeTypeSchema::object_type(load_type.clone(), "LoadType")
//!             .with_super_type(ids::BASE_OBJECT_TYPE)
//!             .with_child(ChildSlot::mandatory("1:Mass", ids::PROPERTY_TYPE)),
//!     )
//!     .build()?;
//!
//! let mut space = AddressSpace::new(Arc::new(registry));
//! let load = space.instantiate(&load_type, "1:FlangeLoad")?;
//! let mass = space.find_child(load, "Mass", false, None)?;
//! assert!(mass.is_some());
//! # Ok::<(), uanode_core::ModelError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod browse;
pub mod defaults;
pub mod enumeration;
pub mod error;
pub mod node;
pub mod registry;
pub mod schema;
pub mod space;
pub mod types;

// Re-export error types
pub use error::{
    DefaultsError, EnumerationError, ErrorCode, ErrorSeverity, InstanceError, ModelError,
    ModelResult, SchemaError,
};

// Re-export model types
pub use defaults::{
    AttributeOverrides, Base64JsonDecoder, DefaultsDecoder, EncodedDefaults, NodeAttributes,
};
pub use registry::{NodeTypeRegistry, NodeTypeRegistryBuilder};
pub use schema::{ChildSlot, NodeTypeSchema, TypeRef};
pub use types::{AccessLevel, NodeClass, NodeId, NodeIdentifier, QualifiedName, Variant};

// Re-export instance types
pub use browse::{BrowsePath, BrowsePathSegment, NodeSnapshot};
pub use enumeration::{EnumerationCode, EnumerationCollection};
pub use node::{ChangeMask, NodeHandle, NodeInstance, NodeState};
pub use space::{AddressSpace, ChangeEvent, ChangeListener};

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
