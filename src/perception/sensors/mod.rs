//! Sensor interfaces for the localizer

/// A forward-facing ultrasonic ranging device
pub trait RangeSensor: Send {
    /// Emit a single ranging pulse
    fn trigger_ping(&mut self);

    /// Distance measured by the last ping, in centimeters
    fn read_distance(&mut self) -> i32;

    /// Stop continuous ranging; later pings still work one at a time
    fn power_off(&mut self);
}
