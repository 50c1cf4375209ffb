// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed views over Robotics nodes.
//!
//! A view is a checked [`NodeHandle`]: constructing one verifies the node's
//! type, and its accessors resolve children by browse name through the
//! generic engine. Views borrow nothing, so the address space is passed to
//! each call.
//!
//! ```text
//! MotionDeviceView ──► MotionDeviceCategory   (MotionDeviceCategoryEnumeration)
//!                 ├──► Axes / PowerTrains     (folders)
//!                 └──► FlangeLoad?  ──► LoadView ──► Mass
//! AxisView         ──► MotionProfile          (AxisMotionProfileEnumeration)
//!                 └──► AdditionalLoad? ──► LoadView
//! SafetyStateView  ──► OperationalMode, EmergencyStop, ProtectiveStop
//! TaskControlView  ──► TaskProgramName, TaskProgramLoaded, ExecutionMode?
//! ```

use uanode_core::{
    AddressSpace, EnumerationCode, ModelError, ModelResult, NodeHandle, NodeId, QualifiedName,
    Variant,
};

use crate::enums::{
    AxisMotionProfileEnumeration, ExecutionModeEnumeration, MotionDeviceCategoryEnumeration,
    OperationalModeEnumeration,
};
use crate::ids;

// =============================================================================
// Helpers
// =============================================================================

fn expect_type(space: &AddressSpace, handle: NodeHandle, base: &NodeId) -> ModelResult<()> {
    let type_id = space.type_id(handle)?;
    let registry = space.registry();
    if registry.is_subtype_of(type_id, base) {
        return Ok(());
    }
    Err(ModelError::type_mismatch(
        space.browse_name(handle)?.to_string(),
        registry.type_name(base),
        registry.type_name(type_id),
    ))
}

/// Resolves a mandatory child, which exists once the parent is initialized.
fn required_child(space: &AddressSpace, handle: NodeHandle, name: &str) -> ModelResult<NodeHandle> {
    space
        .child(handle, QualifiedName::from(name))?
        .ok_or_else(|| ModelError::node_not_found(format!("{}/{}", handle, name)))
}

fn bool_value(space: &AddressSpace, handle: NodeHandle, name: &str) -> ModelResult<bool> {
    let child = required_child(space, handle, name)?;
    match space.value(child)? {
        Variant::Boolean(value) => Ok(*value),
        other => Err(ModelError::wrong_value_type(
            space.browse_name(child)?.to_string(),
            "Boolean",
            other.type_name(),
        )),
    }
}

fn enum_value<E: EnumerationCode>(space: &AddressSpace, handle: NodeHandle, name: &str) -> ModelResult<E> {
    let child = required_child(space, handle, name)?;
    E::from_variant(space.value(child)?)
}

// =============================================================================
// MotionDeviceView
// =============================================================================

/// A manipulator or positioner (`MotionDeviceType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionDeviceView {
    handle: NodeHandle,
}

impl MotionDeviceView {
    /// Wraps a node of `MotionDeviceType` or a subtype.
    pub fn new(space: &AddressSpace, handle: NodeHandle) -> ModelResult<Self> {
        expect_type(space, handle, &ids::MOTION_DEVICE_TYPE)?;
        Ok(Self { handle })
    }

    /// Creates and initializes a detached motion device.
    pub fn instantiate(space: &mut AddressSpace, browse_name: impl Into<QualifiedName>) -> ModelResult<Self> {
        let handle = space.instantiate(&ids::MOTION_DEVICE_TYPE, browse_name)?;
        Ok(Self { handle })
    }

    /// Returns the node handle.
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Returns the kinematic category.
    pub fn motion_device_category(&self, space: &AddressSpace) -> ModelResult<MotionDeviceCategoryEnumeration> {
        enum_value(space, self.handle, "MotionDeviceCategory")
    }

    /// Sets the kinematic category. Returns `true` if the value changed.
    pub fn set_motion_device_category(
        &self,
        space: &mut AddressSpace,
        category: MotionDeviceCategoryEnumeration,
    ) -> ModelResult<bool> {
        let child = required_child(space, self.handle, "MotionDeviceCategory")?;
        space.set_value(child, category.to_variant())
    }

    /// Returns the manufacturer name.
    pub fn manufacturer<'a>(&self, space: &'a AddressSpace) -> ModelResult<Option<&'a str>> {
        let child = required_child(space, self.handle, "Manufacturer")?;
        Ok(space.value(child)?.as_str())
    }

    /// Returns the serial number.
    pub fn serial_number<'a>(&self, space: &'a AddressSpace) -> ModelResult<Option<&'a str>> {
        let child = required_child(space, self.handle, "SerialNumber")?;
        Ok(space.value(child)?.as_str())
    }

    /// Returns the `Axes` folder.
    pub fn axes(&self, space: &AddressSpace) -> ModelResult<NodeHandle> {
        required_child(space, self.handle, "Axes")
    }

    /// Returns the `PowerTrains` folder.
    pub fn power_trains(&self, space: &AddressSpace) -> ModelResult<NodeHandle> {
        required_child(space, self.handle, "PowerTrains")
    }

    /// Returns the flange load, materializing it first if `create` is set.
    pub fn flange_load(&self, space: &mut AddressSpace, create: bool) -> ModelResult<Option<LoadView>> {
        let load = space.find_child(self.handle, "FlangeLoad", create, None)?;
        Ok(load.map(|handle| LoadView { handle }))
    }

    /// Installs a detached load as the flange load.
    pub fn set_flange_load(&self, space: &mut AddressSpace, load: LoadView) -> ModelResult<bool> {
        space.set_child(self.handle, "FlangeLoad", Some(load.handle))
    }

    /// Returns the `AdditionalComponents` folder, materializing it first if
    /// `create` is set.
    pub fn additional_components(
        &self,
        space: &mut AddressSpace,
        create: bool,
    ) -> ModelResult<Option<NodeHandle>> {
        space.find_child(self.handle, "AdditionalComponents", create, None)
    }
}

// =============================================================================
// AxisView
// =============================================================================

/// A single axis (`AxisType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisView {
    handle: NodeHandle,
}

impl AxisView {
    /// Wraps a node of `AxisType` or a subtype.
    pub fn new(space: &AddressSpace, handle: NodeHandle) -> ModelResult<Self> {
        expect_type(space, handle, &ids::AXIS_TYPE)?;
        Ok(Self { handle })
    }

    /// Creates and initializes a detached axis.
    pub fn instantiate(space: &mut AddressSpace, browse_name: impl Into<QualifiedName>) -> ModelResult<Self> {
        let handle = space.instantiate(&ids::AXIS_TYPE, browse_name)?;
        Ok(Self { handle })
    }

    /// Returns the node handle.
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Returns the motion profile. Fails on an undeclared code.
    pub fn motion_profile(&self, space: &AddressSpace) -> ModelResult<AxisMotionProfileEnumeration> {
        enum_value(space, self.handle, "MotionProfile")
    }

    /// Sets the motion profile. Returns `true` if the value changed.
    pub fn set_motion_profile(
        &self,
        space: &mut AddressSpace,
        profile: AxisMotionProfileEnumeration,
    ) -> ModelResult<bool> {
        let child = required_child(space, self.handle, "MotionProfile")?;
        space.set_value(child, profile.to_variant())
    }

    /// Returns the additional load, materializing it first if `create` is set.
    pub fn additional_load(&self, space: &mut AddressSpace, create: bool) -> ModelResult<Option<LoadView>> {
        let load = space.find_child(self.handle, "AdditionalLoad", create, None)?;
        Ok(load.map(|handle| LoadView { handle }))
    }
}

// =============================================================================
// LoadView
// =============================================================================

/// A load on a flange or axis (`LoadType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadView {
    handle: NodeHandle,
}

impl LoadView {
    /// Wraps a node of `LoadType` or a subtype.
    pub fn new(space: &AddressSpace, handle: NodeHandle) -> ModelResult<Self> {
        expect_type(space, handle, &ids::LOAD_TYPE)?;
        Ok(Self { handle })
    }

    /// Creates and initializes a detached load.
    pub fn instantiate(space: &mut AddressSpace, browse_name: impl Into<QualifiedName>) -> ModelResult<Self> {
        let handle = space.instantiate(&ids::LOAD_TYPE, browse_name)?;
        Ok(Self { handle })
    }

    /// Returns the node handle.
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Returns the `Mass` variable.
    pub fn mass_node(&self, space: &AddressSpace) -> ModelResult<NodeHandle> {
        required_child(space, self.handle, "Mass")
    }

    /// Returns the mass, or `None` if the value is not numeric.
    pub fn mass(&self, space: &AddressSpace) -> ModelResult<Option<f64>> {
        let node = self.mass_node(space)?;
        Ok(space.value(node)?.as_f64())
    }

    /// Sets the mass. Returns `true` if the value changed.
    pub fn set_mass(&self, space: &mut AddressSpace, mass: f64) -> ModelResult<bool> {
        let node = self.mass_node(space)?;
        space.set_value(node, Variant::Double(mass))
    }
}

// =============================================================================
// SafetyStateView
// =============================================================================

/// Safety state of a robot system (`SafetyStateType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SafetyStateView {
    handle: NodeHandle,
}

impl SafetyStateView {
    /// Wraps a node of `SafetyStateType` or a subtype.
    pub fn new(space: &AddressSpace, handle: NodeHandle) -> ModelResult<Self> {
        expect_type(space, handle, &ids::SAFETY_STATE_TYPE)?;
        Ok(Self { handle })
    }

    /// Creates and initializes a detached safety state.
    pub fn instantiate(space: &mut AddressSpace, browse_name: impl Into<QualifiedName>) -> ModelResult<Self> {
        let handle = space.instantiate(&ids::SAFETY_STATE_TYPE, browse_name)?;
        Ok(Self { handle })
    }

    /// Returns the node handle.
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Returns the operational mode. Fails on an undeclared code.
    pub fn operational_mode(&self, space: &AddressSpace) -> ModelResult<OperationalModeEnumeration> {
        enum_value(space, self.handle, "OperationalMode")
    }

    /// Sets the operational mode. Returns `true` if the value changed.
    pub fn set_operational_mode(
        &self,
        space: &mut AddressSpace,
        mode: OperationalModeEnumeration,
    ) -> ModelResult<bool> {
        let child = required_child(space, self.handle, "OperationalMode")?;
        space.set_value(child, mode.to_variant())
    }

    /// Returns `true` while an emergency stop is active. A value that is not
    /// a `Boolean` is an error, never read as "no stop".
    pub fn emergency_stop(&self, space: &AddressSpace) -> ModelResult<bool> {
        bool_value(space, self.handle, "EmergencyStop")
    }

    /// Returns `true` while a protective stop is active.
    pub fn protective_stop(&self, space: &AddressSpace) -> ModelResult<bool> {
        bool_value(space, self.handle, "ProtectiveStop")
    }
}

// =============================================================================
// TaskControlView
// =============================================================================

/// Execution of a task program (`TaskControlType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskControlView {
    handle: NodeHandle,
}

impl TaskControlView {
    /// Wraps a node of `TaskControlType` or a subtype.
    pub fn new(space: &AddressSpace, handle: NodeHandle) -> ModelResult<Self> {
        expect_type(space, handle, &ids::TASK_CONTROL_TYPE)?;
        Ok(Self { handle })
    }

    /// Returns the node handle.
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Returns the task program name.
    pub fn task_program_name<'a>(&self, space: &'a AddressSpace) -> ModelResult<Option<&'a str>> {
        let child = required_child(space, self.handle, "TaskProgramName")?;
        Ok(space.value(child)?.as_str())
    }

    /// Returns the execution mode, or `None` if the optional variable was
    /// never materialized.
    pub fn execution_mode(&self, space: &AddressSpace) -> ModelResult<Option<ExecutionModeEnumeration>> {
        match space.child(self.handle, "ExecutionMode")? {
            Some(child) => ExecutionModeEnumeration::from_variant(space.value(child)?).map(Some),
            None => Ok(None),
        }
    }

    /// Sets the execution mode, materializing the variable if needed.
    pub fn set_execution_mode(
        &self,
        space: &mut AddressSpace,
        mode: ExecutionModeEnumeration,
    ) -> ModelResult<bool> {
        let child = space
            .find_child(self.handle, "ExecutionMode", true, None)?
            .ok_or_else(|| ModelError::node_not_found(format!("{}/ExecutionMode", self.handle)))?;
        space.set_value(child, mode.to_variant())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uanode_core::{ChangeMask, InstanceError};

    fn space() -> AddressSpace {
        crate::address_space().unwrap()
    }

    #[test]
    fn test_motion_device_defaults() {
        let mut space = space();
        let device = MotionDeviceView::instantiate(&mut space, "2:Robot1").unwrap();

        assert_eq!(
            device.motion_device_category(&space).unwrap(),
            MotionDeviceCategoryEnumeration::Other
        );
        assert_eq!(device.manufacturer(&space).unwrap(), Some(""));
        assert_eq!(space.browse_name(device.axes(&space).unwrap()).unwrap().name, "Axes");
        assert!(space.child(device.handle(), "PowerTrains").unwrap().is_some());
    }

    #[test]
    fn test_flange_load_is_lazy() {
        let mut space = space();
        let device = MotionDeviceView::instantiate(&mut space, "2:Robot1").unwrap();

        assert!(device.flange_load(&mut space, false).unwrap().is_none());
        let load = device.flange_load(&mut space, true).unwrap().unwrap();
        assert_eq!(load.mass(&space).unwrap(), Some(0.0));
        assert_eq!(device.flange_load(&mut space, false).unwrap(), Some(load));
    }

    #[test]
    fn test_set_category_raises_value_bit() {
        let mut space = space();
        let device = MotionDeviceView::instantiate(&mut space, "2:Robot1").unwrap();

        assert!(device
            .set_motion_device_category(&mut space, MotionDeviceCategoryEnumeration::ArticulatedRobot)
            .unwrap());
        assert!(!device
            .set_motion_device_category(&mut space, MotionDeviceCategoryEnumeration::ArticulatedRobot)
            .unwrap());

        let node = space.child(device.handle(), "MotionDeviceCategory").unwrap().unwrap();
        assert_eq!(space.change_mask(node).unwrap(), ChangeMask::VALUE);
        assert_eq!(space.value(node).unwrap(), &Variant::Int32(1));
    }

    #[test]
    fn test_axis_motion_profile_rejects_unknown_code() {
        let mut space = space();
        let axis = AxisView::instantiate(&mut space, "2:Axis1").unwrap();
        assert_eq!(axis.motion_profile(&space).unwrap(), AxisMotionProfileEnumeration::Other);

        let node = space.child(axis.handle(), "MotionProfile").unwrap().unwrap();
        space.set_value(node, Variant::Int32(7)).unwrap();
        assert!(axis.motion_profile(&space).is_err());

        axis.set_motion_profile(&mut space, AxisMotionProfileEnumeration::Linear).unwrap();
        assert_eq!(axis.motion_profile(&space).unwrap(), AxisMotionProfileEnumeration::Linear);
    }

    #[test]
    fn test_view_type_checked() {
        let mut space = space();
        let axis = AxisView::instantiate(&mut space, "2:Axis1").unwrap();

        let err = MotionDeviceView::new(&space, axis.handle()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Instance(InstanceError::TypeMismatch { .. })
        ));
        assert!(AxisView::new(&space, axis.handle()).is_ok());
    }

    #[test]
    fn test_set_flange_load_replaces() {
        let mut space = space();
        let device = MotionDeviceView::instantiate(&mut space, "2:Robot1").unwrap();
        let load = LoadView::instantiate(&mut space, "2:Gripper").unwrap();
        load.set_mass(&mut space, 4.5).unwrap();

        assert!(device.set_flange_load(&mut space, load).unwrap());
        let installed = device.flange_load(&mut space, false).unwrap().unwrap();
        assert_eq!(installed, load);
        assert_eq!(installed.mass(&space).unwrap(), Some(4.5));
        assert_eq!(space.browse_name(load.handle()).unwrap().name, "FlangeLoad");
    }

    #[test]
    fn test_safety_state() {
        let mut space = space();
        let safety = SafetyStateView::instantiate(&mut space, "2:SafetyState").unwrap();

        assert_eq!(safety.operational_mode(&space).unwrap(), OperationalModeEnumeration::Other);
        assert!(!safety.emergency_stop(&space).unwrap());
        assert!(!safety.protective_stop(&space).unwrap());

        safety
            .set_operational_mode(&mut space, OperationalModeEnumeration::Automatic)
            .unwrap();
        assert_eq!(
            safety.operational_mode(&space).unwrap(),
            OperationalModeEnumeration::Automatic
        );
    }

    #[test]
    fn test_safety_stops_reject_non_boolean_values() {
        let mut space = space();
        let safety = SafetyStateView::instantiate(&mut space, "2:SafetyState").unwrap();
        let emergency = space.child(safety.handle(), "EmergencyStop").unwrap().unwrap();
        let protective = space.child(safety.handle(), "ProtectiveStop").unwrap().unwrap();

        space.set_value(emergency, Variant::String("garbage".into())).unwrap();
        let err = safety.emergency_stop(&space).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Instance(InstanceError::WrongValueType {
                expected: "Boolean",
                actual: "String",
                ..
            })
        ));

        space.set_value(protective, Variant::Null).unwrap();
        assert!(safety.protective_stop(&space).is_err());

        space.set_value(emergency, true).unwrap();
        assert!(safety.emergency_stop(&space).unwrap());
    }

    #[test]
    fn test_task_control_execution_mode() {
        let mut space = space();
        let handle = space.instantiate(&ids::TASK_CONTROL_TYPE, "2:Task1").unwrap();
        let task = TaskControlView::new(&space, handle).unwrap();

        assert_eq!(task.task_program_name(&space).unwrap(), Some(""));
        assert_eq!(task.execution_mode(&space).unwrap(), None);

        task.set_execution_mode(&mut space, ExecutionModeEnumeration::Step).unwrap();
        assert_eq!(
            task.execution_mode(&space).unwrap(),
            Some(ExecutionModeEnumeration::Step)
        );
    }
}
