//! Ultrasonic wall-edge localization for a differential-drive robot
//!
//! The robot rotates in place in front of a wall corner, latches the two
//! headings at which the corner's edges come into view, and uses them to
//! correct its drifted odometry before turning to a canonical heading.
pub mod behaviors;
pub mod common;
pub mod config;
pub mod control;
pub mod error;
pub mod perception;
pub mod simulation;

#[cfg(test)]
mod test_support;

pub use behaviors::localization::{
    LocalizationReport, LocalizationState, LocalizationStatus, UltrasonicLocalizer,
};
pub use config::LocalizerConfig;
pub use error::{LocalizationError, Result};
