//! Four-phase ultrasonic localization sequence
//!
//! The robot sweeps counterclockwise off the wall and back onto its first
//! edge, then clockwise off the wall and onto its second edge. The two edge
//! headings locate the wall corner in the drifted odometry frame, which is
//! then corrected and the robot turned to the canonical heading.

use super::correction::OrientationCorrector;
use super::LocalizationSession;
use crate::common::timing::Clock;
use crate::common::types::{Pose, SweepPhase};
use crate::config::LocalizerConfig;
use crate::control::controllers::RotationDriver;
use crate::control::DriveActuator;
use crate::error::{LocalizationError, Result};
use crate::perception::filters::SensorFilter;
use crate::perception::localization::PoseTracker;
use crate::perception::sensors::RangeSensor;
use crate::perception::wall_detector::{DetectionMode, DetectionOutcome, WallEdgeDetector};
use std::sync::{Arc, RwLock};

/// What the localizer is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalizationState {
    #[default]
    Idle,
    Sweeping(SweepPhase),
    Correcting,
    /// Marked as localizing by another subsystem
    Held,
}

/// Shared, thread-safe view of the localizer state
#[derive(Debug, Clone, Default)]
pub struct LocalizationStatus {
    state: Arc<RwLock<LocalizationState>>,
}

impl LocalizationStatus {
    pub fn state(&self) -> LocalizationState {
        match self.state.read() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn is_localizing(&self) -> bool {
        self.state() != LocalizationState::Idle
    }

    fn set(&self, next: LocalizationState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Returns the status to idle however the run ends
struct ActiveGuard {
    status: LocalizationStatus,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.status.set(LocalizationState::Idle);
    }
}

/// Outcome of a completed localization run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalizationReport {
    /// Tracked heading at the counterclockwise edge
    pub angle_a: f64,
    /// Tracked heading at the clockwise edge
    pub angle_b: f64,
    /// Offset added to the tracked heading
    pub correction: f64,
    /// Tracked pose after the final turn
    pub pose: Pose,
}

/// Wall-edge localizer using a forward ultrasonic sensor
pub struct UltrasonicLocalizer {
    config: LocalizerConfig,
    tracker: Box<dyn PoseTracker>,
    filter: SensorFilter,
    driver: RotationDriver,
    detector: WallEdgeDetector,
    corrector: OrientationCorrector,
    status: LocalizationStatus,
}

impl UltrasonicLocalizer {
    /// Create a localizer. Switches the sensor off and sets the wheel speed.
    pub fn new(
        config: LocalizerConfig,
        tracker: Box<dyn PoseTracker>,
        actuator: Box<dyn DriveActuator>,
        sensor: Box<dyn RangeSensor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let filter = SensorFilter::new(sensor, clock, config.sensor_ceiling, config.settle);
        let driver = RotationDriver::new(
            actuator,
            config.geometry,
            config.rotation_speed,
            config.sweep_degrees,
        );
        Ok(UltrasonicLocalizer {
            detector: WallEdgeDetector::new(&config),
            corrector: OrientationCorrector::new(config.canonical_heading),
            config,
            tracker,
            filter,
            driver,
            status: LocalizationStatus::default(),
        })
    }

    /// Run the full maneuver to completion
    pub fn start_localization(&mut self) -> Result<LocalizationReport> {
        // Mark active before touching any collaborator
        self.status
            .set(LocalizationState::Sweeping(SweepPhase::SEQUENCE[0]));
        let _guard = ActiveGuard {
            status: self.status.clone(),
        };
        log::info!(
            "Starting ultrasonic localization from heading {:.2}",
            self.tracker.heading()
        );

        let result = self.run_sequence();
        match &result {
            Ok(report) => log::info!(
                "Localization complete: correction {:.2}, pose ({:.2}, {:.2}, {:.2})",
                report.correction,
                report.pose.x,
                report.pose.y,
                report.pose.heading
            ),
            Err(e) => {
                self.driver.halt();
                log::warn!("Localization failed: {}", e);
            }
        }
        result
    }

    fn run_sequence(&mut self) -> Result<LocalizationReport> {
        let mut session = LocalizationSession::new();

        for phase in SweepPhase::SEQUENCE {
            self.status.set(LocalizationState::Sweeping(phase));
            self.sweep(phase)?;

            match phase {
                SweepPhase::EdgeCounterclockwise => session.capture_a(self.tracker.heading()),
                SweepPhase::EdgeClockwise => session.capture_b(self.tracker.heading()),
                _ => {}
            }
        }

        self.status.set(LocalizationState::Correcting);
        let pose = self
            .corrector
            .apply(&mut session, self.tracker.as_mut(), &mut self.driver)?;
        let (angle_a, angle_b) = session.edge_headings()?;

        Ok(LocalizationReport {
            angle_a,
            angle_b,
            correction: session.orientation_correction().unwrap_or_default(),
            pose,
        })
    }

    fn sweep(&mut self, phase: SweepPhase) -> Result<()> {
        let clock = self.filter.clock().clone();
        let started = clock.now();
        log::info!("Phase: {}", phase);

        self.driver.spin(phase.direction());
        let mode = if phase.seeks_wall() {
            DetectionMode::SeekingWall
        } else {
            DetectionMode::SeekingClear
        };

        match self.detector.run(mode, &mut self.filter, &mut self.driver) {
            Ok(DetectionOutcome::Edge { distance, polls }) => {
                log::debug!(
                    "{} ended at heading {:.2} ({} cm, {} polls)",
                    phase,
                    self.tracker.heading(),
                    distance,
                    polls
                );
                Ok(())
            }
            Ok(DetectionOutcome::RotationEnded { .. }) | Ok(DetectionOutcome::TimedOut { .. }) => {
                Err(LocalizationError::WallNotFound {
                    phase,
                    elapsed: clock.now() - started,
                })
            }
            Err(e) => {
                log::warn!("{} interrupted: {}", phase, e);
                Err(e)
            }
        }
    }

    pub fn is_localizing(&self) -> bool {
        self.status.is_localizing()
    }

    /// Manually mark the robot as mid-maneuver, or clear the mark
    pub fn set_localizing(&mut self, localizing: bool) {
        self.status.set(if localizing {
            LocalizationState::Held
        } else {
            LocalizationState::Idle
        });
    }

    pub fn state(&self) -> LocalizationState {
        self.status.state()
    }

    /// Handle for observing the state from elsewhere
    pub fn status(&self) -> LocalizationStatus {
        self.status.clone()
    }

    pub fn pose(&self) -> Pose {
        self.tracker.pose()
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }
}
