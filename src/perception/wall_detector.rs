//! Wall edge detection while rotating in place

use crate::config::LocalizerConfig;
use crate::control::controllers::RotationDriver;
use crate::error::Result;
use crate::perception::filters::{FilteredDistance, SensorFilter};
use std::time::Duration;

/// What the detector is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    /// Rotate until the wall has been out of view for the debounce window
    SeekingClear,
    /// Rotate until the wall comes into view; latched on the first close sample
    SeekingWall,
}

/// How a detection run ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionOutcome {
    /// Edge condition met; the wheels were halted
    Edge {
        distance: FilteredDistance,
        polls: usize,
    },
    /// The commanded rotation finished before the edge was seen
    RotationEnded { polls: usize },
    /// The phase ran past its time limit; the wheels were halted
    TimedOut { polls: usize },
}

/// Polls the range sensor during a sweep and stops the wheels on an edge
#[derive(Debug, Clone)]
pub struct WallEdgeDetector {
    clear_threshold: i32,
    wall_threshold: i32,
    debounce: Duration,
    max_duration: Duration,
}

impl WallEdgeDetector {
    pub fn new(config: &LocalizerConfig) -> Self {
        WallEdgeDetector {
            clear_threshold: config.clear_threshold(),
            wall_threshold: config.wall_threshold(),
            debounce: config.debounce,
            max_duration: config.max_phase_duration,
        }
    }

    /// Poll until the edge for `mode` is found, the rotation ends, or the phase times out.
    ///
    /// Only a cancelled wait is an error.
    pub fn run(
        &self,
        mode: DetectionMode,
        filter: &mut SensorFilter,
        driver: &mut RotationDriver,
    ) -> Result<DetectionOutcome> {
        let clock = filter.clock().clone();
        let started = clock.now();
        let mut clear_since: Option<Duration> = None;
        let mut polls = 0;

        while driver.is_rotating() {
            if clock.now() - started >= self.max_duration {
                driver.halt();
                log::warn!("{:?} gave up after {:?}", mode, self.max_duration);
                return Ok(DetectionOutcome::TimedOut { polls });
            }

            let distance = filter.sample()?;
            polls += 1;

            match mode {
                DetectionMode::SeekingWall => {
                    if distance < self.wall_threshold {
                        driver.halt();
                        log::debug!("Wall edge at {} cm after {} polls", distance, polls);
                        return Ok(DetectionOutcome::Edge { distance, polls });
                    }
                }
                DetectionMode::SeekingClear => {
                    if distance > self.clear_threshold {
                        let now = clock.now();
                        let since = *clear_since.get_or_insert(now);
                        if now - since >= self.debounce {
                            driver.halt();
                            log::debug!("Clear of wall at {} cm after {} polls", distance, polls);
                            return Ok(DetectionOutcome::Edge { distance, polls });
                        }
                    } else if clear_since.take().is_some() {
                        log::debug!("Clear reading not confirmed, back at {} cm", distance);
                    }
                }
            }
        }

        Ok(DetectionOutcome::RotationEnded { polls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::timing::Clock;
    use crate::error::LocalizationError;
    use crate::test_support::{FakeActuator, ManualClock, ScriptedSensor};
    use crate::{common::types::RotationDirection, config::ChassisGeometry};
    use std::sync::Arc;

    struct Rig {
        actuator: FakeActuator,
        filter: SensorFilter,
        driver: RotationDriver,
        detector: WallEdgeDetector,
    }

    fn rig(readings: &[i32], clock: ManualClock, config: LocalizerConfig) -> Rig {
        let actuator = FakeActuator::new();
        let filter = SensorFilter::new(
            Box::new(ScriptedSensor::new(readings)),
            Arc::new(clock),
            config.sensor_ceiling,
            config.settle,
        );
        let mut driver = RotationDriver::new(
            Box::new(actuator.clone()),
            ChassisGeometry::default(),
            config.rotation_speed,
            config.sweep_degrees,
        );
        driver.spin(RotationDirection::Counterclockwise);
        Rig {
            actuator,
            filter,
            driver,
            detector: WallEdgeDetector::new(&config),
        }
    }

    #[test]
    fn seeking_wall_halts_on_first_close_sample() {
        let mut rig = rig(&[50, 45, 39, 38, 37, 20], ManualClock::new(), LocalizerConfig::default());
        let outcome = rig
            .detector
            .run(DetectionMode::SeekingWall, &mut rig.filter, &mut rig.driver)
            .unwrap();
        // 38 is not below 40 - 2; 37 is.
        assert_eq!(outcome, DetectionOutcome::Edge { distance: 37, polls: 5 });
        assert!(!rig.driver.is_rotating());
        assert_eq!(rig.actuator.stops(), 2);
    }

    #[test]
    fn seeking_clear_waits_out_the_debounce() {
        let clock = ManualClock::new();
        let mut rig = rig(&[30, 43], clock.clone(), LocalizerConfig::default());
        let outcome = rig
            .detector
            .run(DetectionMode::SeekingClear, &mut rig.filter, &mut rig.driver)
            .unwrap();
        // first clear sample at 100 ms, confirmed on the sample at 1100 ms
        assert_eq!(outcome, DetectionOutcome::Edge { distance: 43, polls: 22 });
        assert_eq!(clock.now(), Duration::from_millis(1100));
    }

    #[test]
    fn transient_spike_does_not_halt_seeking_clear() {
        // A single spike, back under the threshold inside the window, then a
        // long run of close readings. The sweep must still be going.
        let mut readings = vec![30, 50, 35];
        readings.extend(std::iter::repeat(35).take(40));
        let mut config = LocalizerConfig::default();
        config.max_phase_duration = Duration::from_secs(2);
        let mut rig = rig(&readings, ManualClock::new(), config);
        let outcome = rig
            .detector
            .run(DetectionMode::SeekingClear, &mut rig.filter, &mut rig.driver)
            .unwrap();
        assert!(matches!(outcome, DetectionOutcome::TimedOut { .. }));
    }

    #[test]
    fn seeking_wall_ignores_debounce_asymmetrically() {
        // With a very long debounce, the wall edge is still latched at once.
        let mut config = LocalizerConfig::default();
        config.debounce = Duration::from_secs(30);
        let clock = ManualClock::new();
        let mut rig = rig(&[10], clock.clone(), config);
        let outcome = rig
            .detector
            .run(DetectionMode::SeekingWall, &mut rig.filter, &mut rig.driver)
            .unwrap();
        assert_eq!(outcome, DetectionOutcome::Edge { distance: 10, polls: 1 });
        assert_eq!(clock.now(), Duration::from_millis(50));
    }

    #[test]
    fn zero_debounce_halts_on_first_clear_sample() {
        let mut config = LocalizerConfig::default();
        config.debounce = Duration::ZERO;
        let mut rig = rig(&[30, 255], ManualClock::new(), config);
        let outcome = rig
            .detector
            .run(DetectionMode::SeekingClear, &mut rig.filter, &mut rig.driver)
            .unwrap();
        assert_eq!(outcome, DetectionOutcome::Edge { distance: 50, polls: 2 });
    }

    #[test]
    fn finished_rotation_reports_rotation_ended() {
        let mut rig = rig(&[50], ManualClock::new(), LocalizerConfig::default());
        rig.actuator.finish_all();
        let outcome = rig
            .detector
            .run(DetectionMode::SeekingWall, &mut rig.filter, &mut rig.driver)
            .unwrap();
        assert_eq!(outcome, DetectionOutcome::RotationEnded { polls: 0 });
    }

    #[test]
    fn cancellation_surfaces_as_aborted() {
        let clock = ManualClock::new().abort_after(Duration::from_millis(500));
        let mut rig = rig(&[50], clock, LocalizerConfig::default());
        let result = rig
            .detector
            .run(DetectionMode::SeekingWall, &mut rig.filter, &mut rig.driver);
        assert_eq!(result, Err(LocalizationError::Aborted));
    }
}
