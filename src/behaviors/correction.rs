//! Heading correction from two captured wall edges

use super::LocalizationSession;
use crate::common::types::{normalize_degrees, Pose, PoseMask};
use crate::control::controllers::RotationDriver;
use crate::error::Result;
use crate::perception::localization::PoseTracker;

/// True-frame bisector of the edges when the first edge reads lower
const ASCENDING_EDGES_BISECTOR: f64 = 225.0;
/// True-frame bisector of the edges otherwise
const DESCENDING_EDGES_BISECTOR: f64 = 45.0;

/// Re-anchors the pose estimate and turns the robot to the canonical heading
#[derive(Debug, Clone, Copy)]
pub struct OrientationCorrector {
    canonical_heading: f64,
}

impl OrientationCorrector {
    pub fn new(canonical_heading: f64) -> Self {
        OrientationCorrector { canonical_heading }
    }

    /// Heading offset, in [0, 360), to add to the tracked heading.
    ///
    /// `angle_a` and `angle_b` are compared as given, without wrapping.
    pub fn correction(&self, angle_a: f64, angle_b: f64) -> f64 {
        let bisector = (angle_a + angle_b) / 2.0;
        let correction = if angle_a < angle_b {
            ASCENDING_EDGES_BISECTOR - bisector
        } else {
            DESCENDING_EDGES_BISECTOR - bisector
        };
        normalize_degrees(correction)
    }

    /// Correct the tracker, reset its position to the origin, then turn to
    /// the canonical heading. Returns the final tracked pose.
    pub fn apply(
        &self,
        session: &mut LocalizationSession,
        tracker: &mut dyn PoseTracker,
        driver: &mut RotationDriver,
    ) -> Result<Pose> {
        let (angle_a, angle_b) = session.edge_headings()?;
        let correction = self.correction(angle_a, angle_b);
        session.record_correction(correction);

        let heading = normalize_degrees(tracker.heading() + correction);
        log::info!(
            "Edges at {:.2}/{:.2}, correcting heading by {:.2} to {:.2}",
            angle_a,
            angle_b,
            correction,
            heading
        );
        tracker.set_pose(Pose::new(0.0, 0.0, heading), PoseMask::ALL);

        driver.rotate_to_heading(self.canonical_heading, heading);
        Ok(tracker.pose())
    }
}
