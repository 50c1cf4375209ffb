// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uanode-robotics
//!
//! The OPC UA Robotics companion model on top of the uanode engine.
//!
//! The model ships as three compiled descriptions loaded in dependency
//! order, which gives the registry the namespace table below:
//!
//! ```text
//! index  uri                                        description
//! -----  -----------------------------------------  -------------
//!   0    http://opcfoundation.org/UA/               base.yaml
//!   1    http://opcfoundation.org/UA/DI/            di.yaml
//!   2    http://opcfoundation.org/UA/Robotics/      robotics.yaml
//! ```
//!
//! The NodeIds in [`ids`] assume this table.
//!
//! ## Example
//!
//! ```
//! use uanode_robotics::{address_space, MotionDeviceCategoryEnumeration, MotionDeviceView};
//!
//! let mut space = address_space()?;
//! let robot = MotionDeviceView::instantiate(&mut space, "2:Robot1")?;
//!
//! assert_eq!(
//!     robot.motion_device_category(&space)?,
//!     MotionDeviceCategoryEnumeration::Other
//! );
//! assert!(robot.flange_load(&mut space, false)?.is_none());
//!
//! let load = robot.flange_load(&mut space, true)?.expect("declared slot");
//! assert_eq!(load.mass(&space)?, Some(0.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

use std::sync::Arc;

use uanode_config::{ConfigFormat, ConfigResult, ModelLoader};
use uanode_core::{AddressSpace, NodeTypeRegistry};

pub mod enums;
pub mod views;

pub use enums::{
    AxisMotionProfileEnumeration, ExecutionModeEnumeration, MotionDeviceCategoryEnumeration,
    OperationalModeEnumeration,
};
pub use views::{AxisView, LoadView, MotionDeviceView, SafetyStateView, TaskControlView};

// =============================================================================
// Bundled Model
// =============================================================================

/// Base types from namespace 0 that the companion models build on.
pub const BASE_MODEL: &str = include_str!("../model/base.yaml");

/// Device Integration types.
pub const DI_MODEL: &str = include_str!("../model/di.yaml");

/// Robotics types.
pub const ROBOTICS_MODEL: &str = include_str!("../model/robotics.yaml");

/// Device Integration namespace URI.
pub const DI_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/DI/";

/// Robotics namespace URI.
pub const ROBOTICS_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/Robotics/";

/// Type and data type NodeIds in the bundled registry.
pub mod ids {
    use uanode_core::NodeId;

    /// Namespace index of the DI model.
    pub const DI_NAMESPACE: u16 = 1;
    /// Namespace index of the Robotics model.
    pub const ROBOTICS_NAMESPACE: u16 = 2;

    /// `BaseAnalogType`.
    pub const BASE_ANALOG_TYPE: NodeId = NodeId::numeric(0, 15318);
    /// `AnalogUnitType`.
    pub const ANALOG_UNIT_TYPE: NodeId = NodeId::numeric(0, 17497);

    /// `TopologyElementType`.
    pub const TOPOLOGY_ELEMENT_TYPE: NodeId = NodeId::numeric(DI_NAMESPACE, 1001);
    /// `ComponentType`.
    pub const COMPONENT_TYPE: NodeId = NodeId::numeric(DI_NAMESPACE, 15063);

    /// `MotionDeviceSystemType`.
    pub const MOTION_DEVICE_SYSTEM_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1002);
    /// `ControllerType`.
    pub const CONTROLLER_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1003);
    /// `MotionDeviceType`.
    pub const MOTION_DEVICE_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1004);
    /// `TaskControlType`.
    pub const TASK_CONTROL_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1011);
    /// `SafetyStateType`.
    pub const SAFETY_STATE_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1013);
    /// `LoadType`.
    pub const LOAD_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1018);
    /// `MotorType`.
    pub const MOTOR_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1019);
    /// `GearType`.
    pub const GEAR_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 1022);
    /// `AxisType`.
    pub const AXIS_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 16601);
    /// `PowerTrainType`.
    pub const POWER_TRAIN_TYPE: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 16794);

    /// `OperationalModeEnumeration` data type.
    pub const OPERATIONAL_MODE_ENUMERATION: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 3006);
    /// `AxisMotionProfileEnumeration` data type.
    pub const AXIS_MOTION_PROFILE_ENUMERATION: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 3008);
    /// `ExecutionModeEnumeration` data type.
    pub const EXECUTION_MODE_ENUMERATION: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 18191);
    /// `MotionDeviceCategoryEnumeration` data type.
    pub const MOTION_DEVICE_CATEGORY_ENUMERATION: NodeId = NodeId::numeric(ROBOTICS_NAMESPACE, 18193);
}

// =============================================================================
// Registry
// =============================================================================

/// Returns a loader with the bundled descriptions queued in dependency order.
///
/// More descriptions can be queued before building, e.g. a vendor model
/// that extends `MotionDeviceType`.
pub fn model_loader() -> ConfigResult<ModelLoader> {
    ModelLoader::new()
        .load_str(BASE_MODEL, ConfigFormat::Yaml)?
        .load_str(DI_MODEL, ConfigFormat::Yaml)?
        .load_str(ROBOTICS_MODEL, ConfigFormat::Yaml)
}

/// Builds the registry from the bundled descriptions.
pub fn registry() -> ConfigResult<NodeTypeRegistry> {
    let registry = model_loader()?.build()?;
    tracing::debug!(types = registry.len(), "Robotics registry built");
    Ok(registry)
}

/// Creates an empty address space over the bundled registry.
pub fn address_space() -> ConfigResult<AddressSpace> {
    Ok(AddressSpace::new(Arc::new(registry()?)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uanode_core::{NodeClass, QualifiedName};

    #[test]
    fn test_registry_namespaces() {
        let registry = registry().unwrap();
        assert_eq!(registry.namespace_index(DI_NAMESPACE_URI), Some(ids::DI_NAMESPACE));
        assert_eq!(
            registry.namespace_index(ROBOTICS_NAMESPACE_URI),
            Some(ids::ROBOTICS_NAMESPACE)
        );
    }

    #[test]
    fn test_registry_types() {
        let registry = registry().unwrap();
        assert_eq!(registry.len(), 19);

        let load = registry.get_by_name("LoadType").unwrap();
        assert_eq!(load.type_id, ids::LOAD_TYPE);
        assert_eq!(load.node_class, NodeClass::ObjectType);

        let mass = registry.get_by_name("AnalogUnitType").unwrap();
        assert_eq!(mass.type_id, ids::ANALOG_UNIT_TYPE);
        assert_eq!(mass.node_class, NodeClass::VariableType);
    }

    #[test]
    fn test_type_hierarchy() {
        let registry = registry().unwrap();
        assert!(registry.is_subtype_of(&ids::MOTION_DEVICE_TYPE, &ids::COMPONENT_TYPE));
        assert!(registry.is_subtype_of(&ids::AXIS_TYPE, &ids::TOPOLOGY_ELEMENT_TYPE));
        assert!(registry.is_subtype_of(&ids::ANALOG_UNIT_TYPE, &ids::BASE_ANALOG_TYPE));
        assert!(!registry.is_subtype_of(&ids::LOAD_TYPE, &ids::COMPONENT_TYPE));
    }

    #[test]
    fn test_motion_device_slots() {
        let registry = registry().unwrap();
        let slots = registry.effective_slots(&ids::MOTION_DEVICE_TYPE).unwrap();
        let names: Vec<&str> = slots.iter().map(|s| s.browse_name.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "ParameterSet",
                "Manufacturer",
                "Model",
                "ProductCode",
                "SerialNumber",
                "HardwareRevision",
                "SoftwareRevision",
                "MotionDeviceCategory",
                "Axes",
                "PowerTrains",
                "FlangeLoad",
                "AdditionalComponents",
            ]
        );

        let manufacturer = registry
            .find_slot(&ids::MOTION_DEVICE_TYPE, &QualifiedName::new(1, "Manufacturer"))
            .unwrap()
            .unwrap();
        assert!(!manufacturer.optional);

        let flange = registry
            .find_slot(&ids::MOTION_DEVICE_TYPE, &QualifiedName::from("FlangeLoad"))
            .unwrap()
            .unwrap();
        assert!(flange.optional);
        assert_eq!(flange.child_type, ids::LOAD_TYPE);
    }

    #[test]
    fn test_motion_device_instance() {
        let mut space = address_space().unwrap();
        let device = space.instantiate(&ids::MOTION_DEVICE_TYPE, "2:Robot1").unwrap();

        let names: Vec<String> = space
            .children(device)
            .unwrap()
            .into_iter()
            .map(|child| space.browse_name(child).unwrap().name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "Manufacturer",
                "Model",
                "ProductCode",
                "SerialNumber",
                "MotionDeviceCategory",
                "Axes",
                "PowerTrains",
            ]
        );

        let category = space.child(device, "MotionDeviceCategory").unwrap().unwrap();
        let attributes = space.attributes(category).unwrap();
        assert_eq!(attributes.data_type, Some(ids::MOTION_DEVICE_CATEGORY_ENUMERATION));
        assert_eq!(attributes.display_name, "MotionDeviceCategory");
    }

    #[test]
    fn test_extra_description_extends_bundle() {
        let vendor = r#"
model:
  name: Vendor
  version: "1.0"
namespaces:
  - "http://opcfoundation.org/UA/Robotics/"
  - "urn:vendor:robots"
types:
  - id: "ns=2;i=1"
    symbolic_name: VendorRobotType
    super_type: "ns=1;i=1004"
"#;
        let registry = model_loader()
            .unwrap()
            .load_str(vendor, ConfigFormat::Yaml)
            .unwrap()
            .build()
            .unwrap();

        let vendor_type = registry.get_by_name("VendorRobotType").unwrap();
        assert_eq!(vendor_type.type_id.namespace_index, 3);
        assert!(registry.is_subtype_of(&vendor_type.type_id, &ids::MOTION_DEVICE_TYPE));
    }
}
