//! Control module: drive actuation and in-place rotation
pub mod controllers;

use crate::common::types::WheelSide;

/// Target of a single wheel rotation command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelTarget {
    /// Rotate the wheel by this many degrees; negative runs backward
    Degrees(f64),
    /// Keep turning until stopped
    Continuous { forward: bool },
}

/// Per-wheel motor interface of the differential drive
pub trait DriveActuator: Send {
    /// Set wheel speed in wheel degrees per second
    fn set_speed(&mut self, side: WheelSide, degrees_per_second: f64);

    /// Start a rotation. A blocking command returns once the wheel stops.
    fn command_rotation(&mut self, side: WheelSide, target: WheelTarget, blocking: bool);

    /// Whether the wheel is still executing a command
    fn is_moving(&self, side: WheelSide) -> bool;

    /// Stop the wheel immediately
    fn stop(&mut self, side: WheelSide);
}
