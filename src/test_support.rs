//! Scripted collaborators for unit tests

use crate::common::timing::Clock;
use crate::common::types::WheelSide;
use crate::control::{DriveActuator, WheelTarget};
use crate::error::{LocalizationError, Result};
use crate::perception::sensors::RangeSensor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Virtual time that only moves when slept on
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
    abort_at: Option<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any wait that would run past `at`
    pub fn abort_after(mut self, at: Duration) -> Self {
        self.abort_at = Some(at);
        self
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) -> Result<()> {
        let mut now = self.now.lock().unwrap();
        if let Some(at) = self.abort_at {
            if *now + duration > at {
                *now = at;
                return Err(LocalizationError::Aborted);
            }
        }
        *now += duration;
        Ok(())
    }
}

#[derive(Default)]
struct SensorScript {
    readings: Vec<i32>,
    next: usize,
    pings: usize,
    powered_off: bool,
}

/// Replays fixed readings, repeating the last one once exhausted
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    script: Arc<Mutex<SensorScript>>,
}

impl ScriptedSensor {
    pub fn new(readings: &[i32]) -> Self {
        ScriptedSensor {
            script: Arc::new(Mutex::new(SensorScript {
                readings: readings.to_vec(),
                ..Default::default()
            })),
        }
    }

    pub fn pings(&self) -> usize {
        self.script.lock().unwrap().pings
    }

    pub fn powered_off(&self) -> bool {
        self.script.lock().unwrap().powered_off
    }
}

impl RangeSensor for ScriptedSensor {
    fn trigger_ping(&mut self) {
        self.script.lock().unwrap().pings += 1;
    }

    fn read_distance(&mut self) -> i32 {
        let mut script = self.script.lock().unwrap();
        let index = script.next.min(script.readings.len().saturating_sub(1));
        script.next += 1;
        script.readings.get(index).copied().unwrap_or(255)
    }

    fn power_off(&mut self) {
        self.script.lock().unwrap().powered_off = true;
    }
}

type Command = (WheelSide, WheelTarget, bool);

#[derive(Default)]
struct ActuatorLog {
    speeds: (f64, f64),
    moving: [bool; 2],
    commands: Vec<Command>,
    stops: usize,
}

/// Records commands; non-blocking rotations run until stopped
#[derive(Clone, Default)]
pub struct FakeActuator {
    log: Arc<Mutex<ActuatorLog>>,
}

fn index(side: WheelSide) -> usize {
    match side {
        WheelSide::Left => 0,
        WheelSide::Right => 1,
    }
}

impl FakeActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speeds(&self) -> (f64, f64) {
        self.log.lock().unwrap().speeds
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().unwrap().commands.clone()
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stops
    }

    /// Let every running command complete on its own
    pub fn finish_all(&self) {
        self.log.lock().unwrap().moving = [false; 2];
    }
}

impl DriveActuator for FakeActuator {
    fn set_speed(&mut self, side: WheelSide, degrees_per_second: f64) {
        let mut log = self.log.lock().unwrap();
        match side {
            WheelSide::Left => log.speeds.0 = degrees_per_second,
            WheelSide::Right => log.speeds.1 = degrees_per_second,
        }
    }

    fn command_rotation(&mut self, side: WheelSide, target: WheelTarget, blocking: bool) {
        let mut log = self.log.lock().unwrap();
        log.commands.push((side, target, blocking));
        log.moving[index(side)] = !blocking;
    }

    fn is_moving(&self, side: WheelSide) -> bool {
        self.log.lock().unwrap().moving[index(side)]
    }

    fn stop(&mut self, side: WheelSide) {
        let mut log = self.log.lock().unwrap();
        log.moving[index(side)] = false;
        log.stops += 1;
    }
}
