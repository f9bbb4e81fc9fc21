//! Controllers for the robot

use super::{DriveActuator, WheelTarget};
use crate::common::types::{shortest_turn, RotationDirection, WheelSide};
use crate::config::ChassisGeometry;

/// In-place rotation controller for a differential drive robot
pub struct RotationDriver {
    actuator: Box<dyn DriveActuator>,
    geometry: ChassisGeometry,
    // None sweeps continuously
    sweep_degrees: Option<f64>,
}

impl RotationDriver {
    /// Create a new driver and set both wheels to `speed` degrees per second
    pub fn new(
        mut actuator: Box<dyn DriveActuator>,
        geometry: ChassisGeometry,
        speed: f64,
        sweep_degrees: Option<f64>,
    ) -> Self {
        actuator.set_speed(WheelSide::Left, speed);
        actuator.set_speed(WheelSide::Right, speed);
        RotationDriver {
            actuator,
            geometry,
            sweep_degrees,
        }
    }

    /// Wheel rotation (degrees) that turns the chassis in place by `turn_degrees`
    pub fn wheel_angle(&self, wheel_radius: f64, turn_degrees: f64) -> f64 {
        let arc = (self.geometry.track_width / 2.0) * turn_degrees.to_radians();
        (arc / wheel_radius).to_degrees()
    }

    /// Start a sweep in `direction` without waiting for it
    pub fn spin(&mut self, direction: RotationDirection) {
        let sign = direction.left_sign();
        let (left, right) = match self.sweep_degrees {
            Some(sweep) => (
                WheelTarget::Degrees(sign * self.wheel_angle(self.geometry.left_wheel_radius, sweep)),
                WheelTarget::Degrees(-sign * self.wheel_angle(self.geometry.right_wheel_radius, sweep)),
            ),
            None => (
                WheelTarget::Continuous { forward: sign > 0.0 },
                WheelTarget::Continuous { forward: sign < 0.0 },
            ),
        };
        log::debug!("Spinning {:?}", direction);
        self.actuator.command_rotation(WheelSide::Left, left, false);
        self.actuator.command_rotation(WheelSide::Right, right, false);
    }

    /// Whether a commanded rotation is still in progress
    pub fn is_rotating(&self) -> bool {
        self.actuator.is_moving(WheelSide::Left) || self.actuator.is_moving(WheelSide::Right)
    }

    /// Stop both wheels
    pub fn halt(&mut self) {
        self.actuator.stop(WheelSide::Left);
        self.actuator.stop(WheelSide::Right);
    }

    /// Turn in place from `current_heading` to `target_heading` by the shorter arc.
    /// Blocks until the turn completes and returns the chassis turn (clockwise-positive).
    pub fn rotate_to_heading(&mut self, target_heading: f64, current_heading: f64) -> f64 {
        let turn = shortest_turn(current_heading, target_heading);
        let left = self.wheel_angle(self.geometry.left_wheel_radius, turn);
        let right = -self.wheel_angle(self.geometry.right_wheel_radius, turn);
        log::debug!(
            "Turning {:.2} deg to heading {:.2} (wheels {:.1}/{:.1})",
            turn,
            target_heading,
            left,
            right
        );
        self.actuator
            .command_rotation(WheelSide::Left, WheelTarget::Degrees(left), false);
        self.actuator
            .command_rotation(WheelSide::Right, WheelTarget::Degrees(right), true);
        self.halt();
        turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeActuator;
    use approx::assert_abs_diff_eq;

    fn driver(actuator: &FakeActuator, sweep: Option<f64>) -> RotationDriver {
        RotationDriver::new(
            Box::new(actuator.clone()),
            ChassisGeometry::default(),
            80.0,
            sweep,
        )
    }

    #[test]
    fn wheel_angle_matches_arc_length_relation() {
        let actuator = FakeActuator::new();
        let driver = driver(&actuator, Some(360.0));
        // 15.8 * 360 / (2 * 2.15)
        assert_abs_diff_eq!(driver.wheel_angle(2.15, 360.0), 1322.7907, epsilon = 1e-3);
        assert_abs_diff_eq!(driver.wheel_angle(2.15, -90.0), -330.6977, epsilon = 1e-3);
    }

    #[test]
    fn new_sets_both_wheel_speeds() {
        let actuator = FakeActuator::new();
        let _driver = driver(&actuator, Some(360.0));
        assert_eq!(actuator.speeds(), (80.0, 80.0));
    }

    #[test]
    fn clockwise_spin_drives_wheels_in_opposition() {
        let actuator = FakeActuator::new();
        let mut driver = driver(&actuator, Some(360.0));
        driver.spin(RotationDirection::Clockwise);

        let commands = actuator.commands();
        assert_eq!(commands.len(), 2);
        match (commands[0], commands[1]) {
            (
                (WheelSide::Left, WheelTarget::Degrees(left), false),
                (WheelSide::Right, WheelTarget::Degrees(right), false),
            ) => {
                assert!(left > 0.0);
                assert_abs_diff_eq!(left, -right, epsilon = 1e-9);
            }
            other => panic!("unexpected commands {:?}", other),
        }
        assert!(driver.is_rotating());
        driver.halt();
        assert!(!driver.is_rotating());
    }

    #[test]
    fn continuous_spin_without_sweep_limit() {
        let actuator = FakeActuator::new();
        let mut driver = driver(&actuator, None);
        driver.spin(RotationDirection::Counterclockwise);
        assert_eq!(
            actuator.commands(),
            vec![
                (WheelSide::Left, WheelTarget::Continuous { forward: false }, false),
                (WheelSide::Right, WheelTarget::Continuous { forward: true }, false),
            ]
        );
    }

    #[test]
    fn rotate_to_heading_takes_shorter_arc_and_blocks_on_right_wheel() {
        let actuator = FakeActuator::new();
        let mut driver = driver(&actuator, Some(360.0));
        let turn = driver.rotate_to_heading(90.0, 235.0);
        assert_abs_diff_eq!(turn, -145.0, epsilon = 1e-12);

        let commands = actuator.commands();
        assert!(commands[1].2);
        match commands[0].1 {
            WheelTarget::Degrees(left) => assert!(left < 0.0),
            other => panic!("unexpected target {:?}", other),
        }
        assert!(!driver.is_rotating());
    }
}
