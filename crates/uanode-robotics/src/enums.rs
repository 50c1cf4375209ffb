// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Robotics enumeration data types.
//!
//! Codes match the published data type definitions and never change.

use uanode_core::ua_enumeration;

ua_enumeration! {
    /// The kind of motion an axis performs.
    pub enum AxisMotionProfileEnumeration {
        /// Any other kind of motion.
        Other = 0 as "OTHER",
        /// Rotation with a limited range.
        Rotary = 1 as "ROTARY",
        /// Rotation without limits.
        RotaryEndless = 2 as "ROTARY_ENDLESS",
        /// Linear travel with a limited range.
        Linear = 3 as "LINEAR",
        /// Linear travel without limits.
        LinearEndless = 4 as "LINEAR_ENDLESS",
    }
}

ua_enumeration! {
    /// How a task program is executed.
    pub enum ExecutionModeEnumeration {
        /// The program runs once.
        Cycle = 0 as "CYCLE",
        /// The program restarts after it ends.
        Continuous = 1 as "CONTINUOUS",
        /// The program runs one step at a time.
        Step = 2 as "STEP",
    }
}

ua_enumeration! {
    /// The kinematic class of a motion device.
    pub enum MotionDeviceCategoryEnumeration {
        /// Any other kind of motion device.
        Other = 0 as "OTHER",
        /// Serial robot with rotary joints.
        ArticulatedRobot = 1 as "ARTICULATED_ROBOT",
        /// Selective compliance assembly robot arm.
        ScaraRobot = 2 as "SCARA_ROBOT",
        /// Gantry or linear robot.
        CartesianRobot = 3 as "CARTESIAN_ROBOT",
        /// Polar robot.
        SphericalRobot = 4 as "SPHERICAL_ROBOT",
        /// Delta or hexapod robot.
        ParallelRobot = 5 as "PARALLEL_ROBOT",
        /// Robot with a rotary and two linear axes.
        CylindricalRobot = 6 as "CYLINDRICAL_ROBOT",
    }
}

ua_enumeration! {
    /// Safety operational mode of a robot system.
    pub enum OperationalModeEnumeration {
        /// Any other mode.
        Other = 0 as "OTHER",
        /// Manual operation at reduced speed (T1).
        ManualReducedSpeed = 1 as "MANUAL_REDUCED_SPEED",
        /// Manual operation at full speed (T2).
        ManualHighSpeed = 2 as "MANUAL_HIGH_SPEED",
        /// Automatic operation.
        Automatic = 3 as "AUTOMATIC",
        /// Automatic operation controlled by an external device.
        AutomaticExternal = 4 as "AUTOMATIC_EXTERNAL",
    }
}
