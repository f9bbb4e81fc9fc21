//! Simulated robot for exercising the localizer without hardware
//!
//! All collaborators share one `SimWorld`. Virtual time only advances when
//! the localizer waits on the simulated clock or issues a blocking wheel
//! command, so runs are deterministic.
pub mod world;

pub use self::world::{SimWorld, Wall, SENSOR_MAX_RANGE};

use crate::common::timing::{CancelToken, Clock};
use crate::common::types::{Pose, PoseMask, WheelSide};
use crate::control::{DriveActuator, WheelTarget};
use crate::error::{LocalizationError, Result};
use crate::perception::localization::PoseTracker;
use crate::perception::sensors::RangeSensor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

type SharedWorld = Arc<Mutex<SimWorld>>;

fn lock(world: &SharedWorld) -> MutexGuard<'_, SimWorld> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of a simulated world, handing out collaborator views of it
#[derive(Clone)]
pub struct SimulatedRobot {
    world: SharedWorld,
}

impl SimulatedRobot {
    pub fn new(world: SimWorld) -> Self {
        SimulatedRobot {
            world: Arc::new(Mutex::new(world)),
        }
    }

    pub fn pose_tracker(&self) -> SimPoseTracker {
        SimPoseTracker {
            world: Arc::clone(&self.world),
        }
    }

    pub fn actuator(&self) -> SimDrive {
        SimDrive {
            world: Arc::clone(&self.world),
        }
    }

    pub fn range_sensor(&self) -> SimRangeSensor {
        SimRangeSensor {
            world: Arc::clone(&self.world),
        }
    }

    pub fn clock(&self) -> SimClock {
        SimClock {
            world: Arc::clone(&self.world),
            cancel: None,
            abort_at: None,
            realtime: false,
        }
    }

    /// Copy of the current world state
    pub fn snapshot(&self) -> SimWorld {
        lock(&self.world).clone()
    }

    pub fn true_heading(&self) -> f64 {
        lock(&self.world).true_heading()
    }

    pub fn tracked_pose(&self) -> Pose {
        lock(&self.world).odometer().pose()
    }
}

/// Odometer view of the simulated robot
pub struct SimPoseTracker {
    world: SharedWorld,
}

impl PoseTracker for SimPoseTracker {
    fn pose(&self) -> Pose {
        lock(&self.world).odometer().pose()
    }

    fn set_pose(&mut self, pose: Pose, mask: PoseMask) {
        lock(&self.world).odometer_mut().set_pose(pose, mask);
    }
}

/// Wheel motors of the simulated robot
pub struct SimDrive {
    world: SharedWorld,
}

impl DriveActuator for SimDrive {
    fn set_speed(&mut self, side: WheelSide, degrees_per_second: f64) {
        lock(&self.world).set_wheel_speed(side, degrees_per_second);
    }

    fn command_rotation(&mut self, side: WheelSide, target: WheelTarget, blocking: bool) {
        let mut world = lock(&self.world);
        world.command_wheel(side, target);
        if blocking {
            world.run_until_stopped(side);
        }
    }

    fn is_moving(&self, side: WheelSide) -> bool {
        lock(&self.world).wheel_moving(side)
    }

    fn stop(&mut self, side: WheelSide) {
        lock(&self.world).stop_wheel(side);
    }
}

/// Ultrasonic sensor ray-cast against the simulated walls
pub struct SimRangeSensor {
    world: SharedWorld,
}

impl RangeSensor for SimRangeSensor {
    fn trigger_ping(&mut self) {
        lock(&self.world).ping();
    }

    fn read_distance(&mut self) -> i32 {
        lock(&self.world).read_sensor()
    }

    fn power_off(&mut self) {
        lock(&self.world).power_off_sensor();
    }
}

/// Virtual clock; sleeping advances the world
pub struct SimClock {
    world: SharedWorld,
    cancel: Option<CancelToken>,
    abort_at: Option<Duration>,
    realtime: bool,
}

impl SimClock {
    /// Abort waits once `token` is cancelled
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Abort any wait that would run past virtual time `at`
    pub fn abort_after(mut self, at: Duration) -> Self {
        self.abort_at = Some(at);
        self
    }

    /// Pace virtual time against the wall clock
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        lock(&self.world).time()
    }

    fn sleep(&self, duration: Duration) -> Result<()> {
        let (start, step) = {
            let world = lock(&self.world);
            (world.time(), world.step())
        };
        if let Some(at) = self.abort_at {
            if start + duration > at {
                let remaining = at.saturating_sub(start);
                lock(&self.world).advance_by(remaining);
                log::warn!("Simulated wait aborted at {:?}", at);
                return Err(LocalizationError::Aborted);
            }
        }

        let mut left = duration;
        while !left.is_zero() {
            if self.cancelled() {
                log::warn!("Simulated wait of {:?} interrupted by cancellation", duration);
                return Err(LocalizationError::Aborted);
            }
            let dt = step.min(left);
            let paced = Instant::now();
            lock(&self.world).advance(dt);
            if self.realtime {
                std::thread::sleep(dt.saturating_sub(paced.elapsed()));
            }
            left -= dt;
        }
        Ok(())
    }
}
