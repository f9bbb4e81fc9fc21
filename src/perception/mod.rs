//! Perception module: range sampling, pose tracking and wall edge detection
pub mod filters;
pub mod localization;
pub mod sensors;
pub mod wall_detector;
