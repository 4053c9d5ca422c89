// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! Kinematic core of the Glonax arm simulator.
//!
//! The crate holds everything that can be evaluated without a device or a
//! runtime: the forward kinematics of the three joint arm, the transform
//! primitives it is built from, and the input scancodes the controller
//! consumes.

pub mod algorithm;
pub mod geometry;
pub mod input;

pub use algorithm::fk::{
    ArmPose, ForwardKinematics, InvalidDimension, Joint, JointAngles, LinkDimensions, Segment,
};
pub use nalgebra;
