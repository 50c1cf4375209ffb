// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! A small process-cell model used across the integration suites.
//!
//! ```text
//! CellType (ns=1;i=1)
//! ├── Temperature   BaseDataVariableType  mandatory  Double 20.0
//! ├── Sensors       FolderType            mandatory
//! ├── Heater?       HeaterType            optional
//! └── Label?        PropertyType          optional   String ""
//!
//! HeaterType (ns=1;i=2)
//! └── Power         BaseDataVariableType  mandatory  Double 0.0
//!
//! BoostedHeaterType (ns=1;i=3) : HeaterType
//! └── Boost         BaseDataVariableType  mandatory  Boolean false
//! ```

use std::sync::Arc;

use uanode_config::ModelDescription;
use uanode_core::types::ids;
use uanode_core::{AddressSpace, DefaultsDecoder, NodeId, NodeTypeRegistry, NodeTypeSchema};

use super::builders::{DescriptionBuilder, OverridesBuilder};

// =============================================================================
// Cell Model
// =============================================================================

/// Namespace URI of the cell model.
pub const CELL_NAMESPACE_URI: &str = "urn:uanode:test:cells";

/// `CellType`.
pub const CELL_TYPE: NodeId = NodeId::numeric(1, 1);

/// `HeaterType`.
pub const HEATER_TYPE: NodeId = NodeId::numeric(1, 2);

/// `BoostedHeaterType`.
pub const BOOSTED_HEATER_TYPE: NodeId = NodeId::numeric(1, 3);

/// Double data type (i=11).
pub const DOUBLE: NodeId = NodeId::numeric(0, 11);

/// Fixture providing the cell model in its different forms.
pub struct CellModel;

impl CellModel {
    /// Defaults of `CellType` itself.
    pub fn cell_defaults() -> OverridesBuilder {
        OverridesBuilder::new().description("A process cell.")
    }

    /// Defaults of the `Temperature` slot.
    pub fn temperature_defaults() -> OverridesBuilder {
        OverridesBuilder::new()
            .display_name("Temperature")
            .description("Cell temperature in degrees Celsius.")
            .data_type(DOUBLE)
            .scalar()
            .access_level(0x03)
            .value(20.0)
    }

    /// Defaults of the `Label` slot.
    pub fn label_defaults() -> OverridesBuilder {
        OverridesBuilder::new().display_name("Label").value("")
    }

    /// Defaults of the `Power` slot.
    pub fn power_defaults() -> OverridesBuilder {
        OverridesBuilder::new().display_name("Power").data_type(DOUBLE).value(0.0)
    }

    /// Defaults of the `Boost` slot.
    pub fn boost_defaults() -> OverridesBuilder {
        OverridesBuilder::new().display_name("Boost").value(false)
    }

    /// Base types the cell model builds on.
    pub fn base_types() -> Vec<NodeTypeSchema> {
        vec![
            NodeTypeSchema::object_type(ids::BASE_OBJECT_TYPE, "BaseObjectType"),
            NodeTypeSchema::object_type(ids::FOLDER_TYPE, "FolderType")
                .with_super_type(ids::BASE_OBJECT_TYPE),
            NodeTypeSchema::variable_type(ids::BASE_VARIABLE_TYPE, "BaseVariableType"),
            NodeTypeSchema::variable_type(ids::BASE_DATA_VARIABLE_TYPE, "BaseDataVariableType")
                .with_super_type(ids::BASE_VARIABLE_TYPE),
            NodeTypeSchema::variable_type(ids::PROPERTY_TYPE, "PropertyType")
                .with_super_type(ids::BASE_VARIABLE_TYPE),
        ]
    }

    /// Cell model types.
    pub fn cell_types() -> Vec<NodeTypeSchema> {
        use uanode_core::ChildSlot;

        vec![
            NodeTypeSchema::object_type(CELL_TYPE, "CellType")
                .with_super_type(ids::BASE_OBJECT_TYPE)
                .with_defaults(Self::cell_defaults().encode())
                .with_child(
                    ChildSlot::mandatory("1:Temperature", ids::BASE_DATA_VARIABLE_TYPE)
                        .with_defaults(Self::temperature_defaults().encode()),
                )
                .with_mandatory("1:Sensors", ids::FOLDER_TYPE)
                .with_optional("1:Heater", HEATER_TYPE)
                .with_child(
                    ChildSlot::optional("1:Label", ids::PROPERTY_TYPE)
                        .with_defaults(Self::label_defaults().encode()),
                ),
            NodeTypeSchema::object_type(HEATER_TYPE, "HeaterType")
                .with_super_type(ids::BASE_OBJECT_TYPE)
                .with_child(
                    ChildSlot::mandatory("1:Power", ids::BASE_DATA_VARIABLE_TYPE)
                        .with_defaults(Self::power_defaults().encode()),
                ),
            NodeTypeSchema::object_type(BOOSTED_HEATER_TYPE, "BoostedHeaterType")
                .with_super_type(HEATER_TYPE)
                .with_child(
                    ChildSlot::mandatory("1:Boost", ids::BASE_DATA_VARIABLE_TYPE)
                        .with_defaults(Self::boost_defaults().encode()),
                ),
        ]
    }

    /// Builds the registry directly from schemas.
    pub fn registry() -> Arc<NodeTypeRegistry> {
        let registry = NodeTypeRegistry::builder()
            .namespace(CELL_NAMESPACE_URI)
            .add_types(Self::base_types())
            .add_types(Self::cell_types())
            .build()
            .expect("cell model is valid");
        Arc::new(registry)
    }

    /// Creates an empty address space over the cell model.
    pub fn space() -> AddressSpace {
        AddressSpace::new(Self::registry())
    }

    /// Creates an empty address space with a custom decoder.
    pub fn space_with_decoder(decoder: Arc<dyn DefaultsDecoder>) -> AddressSpace {
        AddressSpace::with_decoder(Self::registry(), decoder)
    }

    /// The base types as a model description.
    pub fn base_description() -> ModelDescription {
        DescriptionBuilder::new("Base")
            .object_type("i=58", "BaseObjectType", None)
            .object_type("i=61", "FolderType", Some("BaseObjectType"))
            .variable_type("i=62", "BaseVariableType", None)
            .variable_type("i=63", "BaseDataVariableType", Some("BaseVariableType"))
            .variable_type("i=68", "PropertyType", Some("BaseVariableType"))
            .build()
    }

    /// The cell types as a model description.
    pub fn cell_description() -> DescriptionBuilder {
        DescriptionBuilder::new("Cells")
            .namespace(CELL_NAMESPACE_URI)
            .object_type("ns=1;i=1", "CellType", Some("BaseObjectType"))
            .type_defaults(&Self::cell_defaults())
            .child(
                "1:Temperature",
                "BaseDataVariableType",
                false,
                Some(&Self::temperature_defaults()),
            )
            .child("1:Sensors", "FolderType", false, None)
            .child("1:Heater", "HeaterType", true, None)
            .child("1:Label", "PropertyType", true, Some(&Self::label_defaults()))
            .object_type("ns=1;i=2", "HeaterType", Some("BaseObjectType"))
            .child("1:Power", "BaseDataVariableType", false, Some(&Self::power_defaults()))
            .object_type("ns=1;i=3", "BoostedHeaterType", Some("ns=1;i=2"))
            .child("1:Boost", "BaseDataVariableType", false, Some(&Self::boost_defaults()))
    }

    /// Host configuration text listing the given model files.
    pub fn host_config_yaml(files: &[&str]) -> String {
        let mut text = String::from("model:\n  files:\n");
        for file in files {
            text.push_str(&format!("    - {}\n", file));
        }
        text.push_str("logging:\n  level: debug\n  format: compact\n");
        text
    }
}
