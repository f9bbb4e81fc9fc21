//! Kinematic world model: walls, wheels and a drifting odometer

use crate::common::types::{normalize_degrees, Pose, WheelSide};
use crate::config::ChassisGeometry;
use crate::control::WheelTarget;
use crate::perception::localization::{Odometer, PoseTracker};
use nalgebra::{Point2, Vector2};
use std::collections::HashMap;
use std::time::Duration;

/// Largest distance the simulated sensor reports (cm)
pub const SENSOR_MAX_RANGE: i32 = 255;

/// A straight wall segment, in centimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl Wall {
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Wall {
            start: Point2::new(start.0, start.1),
            end: Point2::new(end.0, end.1),
        }
    }

    /// Distance along a unit ray to this wall, if the ray hits it
    pub fn intersect(&self, origin: &Point2<f64>, direction: &Vector2<f64>) -> Option<f64> {
        let segment = self.end - self.start;
        let denom = direction.perp(&segment);
        if denom.abs() < 1e-12 {
            return None;
        }
        let offset = self.start - *origin;
        let along_ray = offset.perp(&segment) / denom;
        let along_wall = offset.perp(direction) / denom;
        if along_ray >= 0.0 && (0.0..=1.0).contains(&along_wall) {
            Some(along_ray)
        } else {
            None
        }
    }
}

/// Unit vector for a clockwise-from-north heading in degrees
pub fn heading_vector(heading: f64) -> Vector2<f64> {
    let radians = heading.to_radians();
    Vector2::new(radians.sin(), radians.cos())
}

#[derive(Debug, Clone, Copy, Default)]
struct SimWheel {
    speed: f64,
    remaining: f64,
    continuous: Option<f64>,
}

impl SimWheel {
    fn is_moving(&self) -> bool {
        self.speed > 0.0 && (self.continuous.is_some() || self.remaining != 0.0)
    }

    fn command(&mut self, target: WheelTarget) {
        match target {
            WheelTarget::Degrees(degrees) => {
                self.remaining = degrees;
                self.continuous = None;
            }
            WheelTarget::Continuous { forward } => {
                self.remaining = 0.0;
                self.continuous = Some(if forward { 1.0 } else { -1.0 });
            }
        }
    }

    fn stop(&mut self) {
        self.remaining = 0.0;
        self.continuous = None;
    }

    /// Rotate for `secs`, returning wheel degrees turned
    fn advance(&mut self, secs: f64) -> f64 {
        let step = self.speed * secs;
        if let Some(sign) = self.continuous {
            return sign * step;
        }
        if self.remaining == 0.0 {
            return 0.0;
        }
        // finish exactly on target
        let delta = if self.remaining.abs() <= step {
            self.remaining
        } else {
            step.copysign(self.remaining)
        };
        self.remaining -= delta;
        delta
    }
}

/// Simulated robot in a walled environment
#[derive(Debug, Clone)]
pub struct SimWorld {
    geometry: ChassisGeometry,
    position: Point2<f64>,
    true_heading: f64,
    odometer: Odometer,
    wheels: [SimWheel; 2],
    walls: Vec<Wall>,
    time: Duration,
    step: Duration,
    spikes: HashMap<usize, i32>,
    samples: usize,
    pings: usize,
    sensor_powered: bool,
}

fn wheel_index(side: WheelSide) -> usize {
    match side {
        WheelSide::Left => 0,
        WheelSide::Right => 1,
    }
}

impl SimWorld {
    /// Empty world with the robot at the origin, heading north, odometry exact
    pub fn new(geometry: ChassisGeometry) -> Self {
        SimWorld {
            geometry,
            position: Point2::origin(),
            true_heading: 0.0,
            odometer: Odometer::new(),
            wheels: [SimWheel::default(); 2],
            walls: Vec::new(),
            time: Duration::ZERO,
            step: Duration::from_millis(10),
            spikes: HashMap::new(),
            samples: 0,
            pings: 0,
            sensor_powered: true,
        }
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.walls.push(wall);
        self
    }

    /// Two walls meeting north-east of the robot, each `distance` cm away.
    /// The corner lies at true heading 45.
    pub fn with_corner(mut self, distance: f64) -> Self {
        self.position = Point2::new(-distance, -distance);
        self.with_wall(Wall::new((-300.0, 0.0), (0.0, 0.0)))
            .with_wall(Wall::new((0.0, 0.0), (0.0, -300.0)))
    }

    /// True heading, with the odometer reading `drift` degrees off it
    pub fn with_heading(mut self, true_heading: f64, drift: f64) -> Self {
        self.true_heading = normalize_degrees(true_heading);
        self.odometer = Odometer::with_pose(Pose::new(0.0, 0.0, true_heading + drift));
        self
    }

    /// Replace the `index`-th sensor reading (0-based) with `value`
    pub fn with_spike(mut self, index: usize, value: i32) -> Self {
        self.spikes.insert(index, value);
        self
    }

    pub fn time(&self) -> Duration {
        self.time
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn true_heading(&self) -> f64 {
        self.true_heading
    }

    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn pings(&self) -> usize {
        self.pings
    }

    pub fn sensor_powered(&self) -> bool {
        self.sensor_powered
    }

    pub fn odometer(&self) -> &Odometer {
        &self.odometer
    }

    pub fn odometer_mut(&mut self) -> &mut Odometer {
        &mut self.odometer
    }

    /// Distance to the nearest wall straight ahead, in whole centimeters
    pub fn range_ahead(&self) -> i32 {
        let direction = heading_vector(self.true_heading);
        self.walls
            .iter()
            .filter_map(|wall| wall.intersect(&self.position, &direction))
            .min_by(f64::total_cmp)
            .map_or(SENSOR_MAX_RANGE, |d| {
                (d.round() as i32).min(SENSOR_MAX_RANGE)
            })
    }

    pub(crate) fn ping(&mut self) {
        self.pings += 1;
    }

    pub(crate) fn read_sensor(&mut self) -> i32 {
        let index = self.samples;
        self.samples += 1;
        self.spikes
            .get(&index)
            .copied()
            .unwrap_or_else(|| self.range_ahead())
    }

    pub(crate) fn power_off_sensor(&mut self) {
        self.sensor_powered = false;
    }

    pub(crate) fn set_wheel_speed(&mut self, side: WheelSide, speed: f64) {
        self.wheels[wheel_index(side)].speed = speed;
    }

    pub(crate) fn command_wheel(&mut self, side: WheelSide, target: WheelTarget) {
        self.wheels[wheel_index(side)].command(target);
    }

    pub(crate) fn stop_wheel(&mut self, side: WheelSide) {
        self.wheels[wheel_index(side)].stop();
    }

    pub fn wheel_moving(&self, side: WheelSide) -> bool {
        self.wheels[wheel_index(side)].is_moving()
    }

    /// Integrate wheel motion over one interval
    pub fn advance(&mut self, dt: Duration) {
        let secs = dt.as_secs_f64();
        let left = self.wheels[0].advance(secs) * self.geometry.left_wheel_radius;
        let right = self.wheels[1].advance(secs) * self.geometry.right_wheel_radius;

        // wheel degrees times radius: arc lengths scaled by 180/pi
        let turn = (left - right) / self.geometry.track_width;
        let forward = ((left + right) / 2.0).to_radians();

        let true_direction = heading_vector(self.true_heading);
        self.position += true_direction * forward;
        let odo_direction = heading_vector(self.odometer.heading());
        self.odometer.update((
            odo_direction.x * forward,
            odo_direction.y * forward,
            turn,
        ));
        self.true_heading = normalize_degrees(self.true_heading + turn);
        self.time += dt;
    }

    /// Integrate in fixed steps for `duration`
    pub fn advance_by(&mut self, duration: Duration) {
        let mut left = duration;
        while !left.is_zero() {
            let dt = self.step.min(left);
            self.advance(dt);
            left -= dt;
        }
    }

    /// Step until the wheel has finished its bounded command
    pub(crate) fn run_until_stopped(&mut self, side: WheelSide) {
        let wheel = self.wheels[wheel_index(side)];
        if wheel.continuous.is_some() {
            log::warn!("Ignoring blocking request on continuous {:?} wheel", side);
            return;
        }
        while self.wheel_moving(side) {
            self.advance(self.step);
        }
    }
}
