//! Behaviors module: the wall-edge localization maneuver
pub mod correction;
pub mod localization;

use crate::error::{LocalizationError, Result};

/// Edge headings and correction gathered during one localization run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalizationSession {
    captured_a: Option<f64>,
    captured_b: Option<f64>,
    orientation_correction: Option<f64>,
}

impl LocalizationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading of the edge found by the counterclockwise sweep
    pub fn capture_a(&mut self, heading: f64) {
        debug_assert!(self.captured_a.is_none(), "first edge captured twice");
        self.captured_a = Some(heading);
    }

    /// Heading of the edge found by the clockwise sweep
    pub fn capture_b(&mut self, heading: f64) {
        debug_assert!(self.captured_b.is_none(), "second edge captured twice");
        self.captured_b = Some(heading);
    }

    /// Both edge headings, once both exist
    pub fn edge_headings(&self) -> Result<(f64, f64)> {
        match (self.captured_a, self.captured_b) {
            (Some(a), Some(b)) => Ok((a, b)),
            (None, _) => Err(LocalizationError::IncompleteSweep(
                "counterclockwise edge not captured",
            )),
            (_, None) => Err(LocalizationError::IncompleteSweep(
                "clockwise edge not captured",
            )),
        }
    }

    pub fn record_correction(&mut self, correction: f64) {
        self.orientation_correction = Some(correction);
    }

    pub fn orientation_correction(&self) -> Option<f64> {
        self.orientation_correction
    }
}
