//! Filtering algorithms for sensor data

use crate::common::timing::Clock;
use crate::error::Result;
use crate::perception::sensors::RangeSensor;
use std::sync::Arc;
use std::time::Duration;

/// A distance sample in centimeters, never above the filter's ceiling
pub type FilteredDistance = i32;

/// A generic filter interface
pub trait Filter<T> {
    /// Filter the input data
    fn filter(&self, input: T) -> T;
}

/// Clamps readings to the range the sensor reports reliably
#[derive(Debug, Clone, Copy)]
pub struct ClampFilter {
    ceiling: i32,
}

impl ClampFilter {
    /// Create a new clamp filter
    pub fn new(ceiling: i32) -> Self {
        ClampFilter { ceiling }
    }

    pub fn ceiling(&self) -> i32 {
        self.ceiling
    }
}

impl Filter<i32> for ClampFilter {
    fn filter(&self, input: i32) -> i32 {
        input.min(self.ceiling)
    }
}

/// Ping-wait-read sampling of a range sensor with clamping
pub struct SensorFilter {
    sensor: Box<dyn RangeSensor>,
    clock: Arc<dyn Clock>,
    clamp: ClampFilter,
    settle: Duration,
}

impl SensorFilter {
    /// Wrap a sensor. The sensor is switched off until sampled.
    pub fn new(
        mut sensor: Box<dyn RangeSensor>,
        clock: Arc<dyn Clock>,
        ceiling: i32,
        settle: Duration,
    ) -> Self {
        sensor.power_off();
        SensorFilter {
            sensor,
            clock,
            clamp: ClampFilter::new(ceiling),
            settle,
        }
    }

    /// Take one sample. Blocks for the settling interval.
    pub fn sample(&mut self) -> Result<FilteredDistance> {
        self.sensor.trigger_ping();
        self.clock.sleep(self.settle)?;
        let raw = self.sensor.read_distance();
        let distance = self.clamp.filter(raw);
        log::trace!("Range sample: raw={} filtered={}", raw, distance);
        Ok(distance)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
