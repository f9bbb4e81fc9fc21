//! Configuration for the ultrasonic localizer
//!
//! All parameters have defaults matching the reference robot (40 cm wall,
//! 2.15 cm wheels on a 15.8 cm track). Overrides arrive as a flat
//! name/value map, the same way path followers are configured.

use crate::error::{LocalizationError, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Fixed chassis geometry, in centimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChassisGeometry {
    pub left_wheel_radius: f64,
    pub right_wheel_radius: f64,
    pub track_width: f64,
}

impl Default for ChassisGeometry {
    fn default() -> Self {
        ChassisGeometry {
            left_wheel_radius: 2.15,
            right_wheel_radius: 2.15,
            track_width: 15.8,
        }
    }
}

/// Localizer parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizerConfig {
    /// Reference wall distance (cm)
    pub wall_distance: i32,
    /// Hysteresis around the wall distance (cm)
    pub noise_margin: i32,
    /// Readings above this are clamped; treated as "no wall" (cm)
    pub sensor_ceiling: i32,
    /// Echo settling time between ping and read
    pub settle: Duration,
    /// How long a clear reading must persist before the wheels stop
    pub debounce: Duration,
    /// Wheel speed during the maneuver (wheel degrees per second)
    pub rotation_speed: f64,
    pub geometry: ChassisGeometry,
    /// Heading the robot is turned to once corrected (degrees)
    pub canonical_heading: f64,
    /// Chassis degrees commanded per sweep; `None` rotates continuously
    pub sweep_degrees: Option<f64>,
    /// Upper bound on a single sweep phase
    pub max_phase_duration: Duration,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        LocalizerConfig {
            wall_distance: 40,
            noise_margin: 2,
            sensor_ceiling: 50,
            settle: Duration::from_millis(50),
            debounce: Duration::from_millis(1000),
            rotation_speed: 80.0,
            geometry: ChassisGeometry::default(),
            canonical_heading: 90.0,
            sweep_degrees: Some(360.0),
            max_phase_duration: Duration::from_secs(60),
        }
    }
}

impl LocalizerConfig {
    /// Distance above which the wall is considered out of view
    pub fn clear_threshold(&self) -> i32 {
        self.wall_distance + self.noise_margin
    }

    /// Distance below which the wall edge is latched
    pub fn wall_threshold(&self) -> i32 {
        self.wall_distance - self.noise_margin
    }

    /// Configure from named parameters. Unknown keys are ignored.
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        let mut next = self.clone();

        if let Some(&wall_distance) = params.get("wall_distance") {
            next.wall_distance = whole_centimeters("wall_distance", wall_distance)?;
        }

        if let Some(&noise_margin) = params.get("noise_margin") {
            if noise_margin < 0.0 {
                return Err(invalid("Noise margin must not be negative"));
            }
            next.noise_margin = whole_centimeters("noise_margin", noise_margin)?;
        }

        if let Some(&ceiling) = params.get("sensor_ceiling") {
            next.sensor_ceiling = whole_centimeters("sensor_ceiling", ceiling)?;
        }

        if let Some(&settle_ms) = params.get("settle_ms") {
            if !positive(settle_ms) {
                return Err(invalid("Settle time must be positive"));
            }
            next.settle = Duration::from_secs_f64(settle_ms / 1000.0);
        }

        if let Some(&debounce_ms) = params.get("debounce_ms") {
            if !debounce_ms.is_finite() || debounce_ms < 0.0 {
                return Err(invalid("Debounce must not be negative"));
            }
            next.debounce = Duration::from_secs_f64(debounce_ms / 1000.0);
        }

        if let Some(&speed) = params.get("rotation_speed") {
            next.rotation_speed = speed;
        }

        if let Some(&radius) = params.get("left_wheel_radius") {
            next.geometry.left_wheel_radius = radius;
        }

        if let Some(&radius) = params.get("right_wheel_radius") {
            next.geometry.right_wheel_radius = radius;
        }

        if let Some(&width) = params.get("track_width") {
            next.geometry.track_width = width;
        }

        if let Some(&heading) = params.get("canonical_heading") {
            if !heading.is_finite() {
                return Err(invalid("Canonical heading must be finite"));
            }
            next.canonical_heading = heading;
        }

        if let Some(&sweep) = params.get("sweep_degrees") {
            next.sweep_degrees = if sweep == 0.0 {
                None
            } else if sweep > 0.0 {
                Some(sweep)
            } else {
                return Err(invalid("Sweep must be positive, or zero for continuous"));
            };
        }

        if let Some(&secs) = params.get("max_phase_secs") {
            if !positive(secs) {
                return Err(invalid("Maximum phase duration must be positive"));
            }
            next.max_phase_duration = Duration::from_secs_f64(secs);
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check every field and the constraints between them. Both
    /// `configure` and direct construction go through here.
    pub fn validate(&self) -> Result<()> {
        // A zero settle never advances the clock, so no phase could time out.
        if self.settle.is_zero() {
            return Err(invalid("Settle time must be positive"));
        }
        if self.max_phase_duration.is_zero() {
            return Err(invalid("Maximum phase duration must be positive"));
        }
        if !positive(self.rotation_speed) {
            return Err(invalid("Rotation speed must be positive"));
        }
        if !positive(self.geometry.left_wheel_radius) {
            return Err(invalid("Left wheel radius must be positive"));
        }
        if !positive(self.geometry.right_wheel_radius) {
            return Err(invalid("Right wheel radius must be positive"));
        }
        if !positive(self.geometry.track_width) {
            return Err(invalid("Track width must be positive"));
        }
        if matches!(self.sweep_degrees, Some(sweep) if !positive(sweep)) {
            return Err(invalid("Sweep must be positive, or zero for continuous"));
        }
        if self.debounce >= self.max_phase_duration {
            return Err(invalid(
                "Debounce must be shorter than the maximum phase duration",
            ));
        }
        if self.wall_threshold() <= 0 {
            return Err(invalid("Wall distance must exceed the noise margin"));
        }
        // A clamped reading can never exceed the ceiling, so the clear
        // condition would be unreachable.
        if self.clear_threshold() >= self.sensor_ceiling {
            return Err(invalid(
                "Sensor ceiling must be above wall distance plus noise margin",
            ));
        }
        Ok(())
    }
}

fn whole_centimeters(name: &str, value: f64) -> Result<i32> {
    if value.fract() != 0.0 || value < 0.0 || value > i32::MAX as f64 {
        return Err(invalid(&format!(
            "{} must be a non-negative whole number of centimeters",
            name
        )));
    }
    Ok(value as i32)
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(message: &str) -> LocalizationError {
    LocalizationError::InvalidParameter(message.to_string())
}
