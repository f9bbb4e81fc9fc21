//! Pose tracking

use crate::common::types::{normalize_degrees, Pose, PoseMask};

/// Source of the robot's dead-reckoned pose, accepting corrections
pub trait PoseTracker: Send {
    /// Current pose estimate
    fn pose(&self) -> Pose;

    /// Current heading in degrees, [0, 360)
    fn heading(&self) -> f64 {
        self.pose().heading
    }

    /// Replace the fields selected by `mask` in one step
    fn set_pose(&mut self, pose: Pose, mask: PoseMask);
}

/// A dead-reckoning odometer for the robot
#[derive(Debug, Clone, Default)]
pub struct Odometer {
    pose: Pose,
}

impl Odometer {
    /// Create a new odometer at the origin
    pub fn new() -> Self {
        Odometer {
            pose: Pose::default(),
        }
    }

    pub fn with_pose(pose: Pose) -> Self {
        Odometer {
            pose: Pose::new(pose.x, pose.y, pose.heading),
        }
    }

    /// Integrate a displacement `(dx, dy)` and a clockwise turn in degrees
    pub fn update(&mut self, odom_delta: (f64, f64, f64)) {
        self.pose.x += odom_delta.0;
        self.pose.y += odom_delta.1;
        self.pose.heading = normalize_degrees(self.pose.heading + odom_delta.2);
    }
}

impl PoseTracker for Odometer {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose, mask: PoseMask) {
        if mask.x {
            self.pose.x = pose.x;
        }
        if mask.y {
            self.pose.y = pose.y;
        }
        if mask.heading {
            self.pose.heading = normalize_degrees(pose.heading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_wraps_heading() {
        let mut odo = Odometer::with_pose(Pose::new(0.0, 0.0, 350.0));
        odo.update((1.0, -2.0, 20.0));
        assert_eq!(odo.pose(), Pose::new(1.0, -2.0, 10.0));
        odo.update((0.0, 0.0, -30.0));
        assert_eq!(odo.heading(), 340.0);
    }

    #[test]
    fn masked_set_only_touches_selected_fields() {
        let mut odo = Odometer::with_pose(Pose::new(5.0, 6.0, 7.0));
        odo.set_pose(Pose { x: 0.0, y: 0.0, heading: -90.0 }, PoseMask::HEADING);
        assert_eq!(odo.pose(), Pose::new(5.0, 6.0, 270.0));
        odo.set_pose(Pose::new(0.0, 0.0, 45.0), PoseMask::ALL);
        assert_eq!(odo.pose(), Pose::new(0.0, 0.0, 45.0));
    }
}
