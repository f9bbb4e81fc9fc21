//! Common utilities and types for the localizer
pub mod timing;

/// Common types and utilities used across the codebase
pub mod types {
    use std::fmt;

    /// A planar pose. Heading is in degrees, clockwise-positive, in [0, 360).
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Pose {
        pub x: f64,
        pub y: f64,
        pub heading: f64,
    }

    impl Pose {
        /// Create a pose, normalizing the heading
        pub fn new(x: f64, y: f64, heading: f64) -> Self {
            Pose {
                x,
                y,
                heading: normalize_degrees(heading),
            }
        }
    }

    /// Selects which pose fields a replacement overwrites
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PoseMask {
        pub x: bool,
        pub y: bool,
        pub heading: bool,
    }

    impl PoseMask {
        pub const ALL: PoseMask = PoseMask {
            x: true,
            y: true,
            heading: true,
        };

        pub const HEADING: PoseMask = PoseMask {
            x: false,
            y: false,
            heading: true,
        };
    }

    /// Direction of an in-place chassis rotation
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum RotationDirection {
        Clockwise,
        Counterclockwise,
    }

    impl RotationDirection {
        /// Sign applied to the left wheel; the right wheel takes the opposite
        pub fn left_sign(self) -> f64 {
            match self {
                RotationDirection::Clockwise => 1.0,
                RotationDirection::Counterclockwise => -1.0,
            }
        }
    }

    /// One side of the differential drive
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum WheelSide {
        Left,
        Right,
    }

    /// The four sweep phases of a localization run
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SweepPhase {
        /// Counterclockwise, away from any wall in view
        ClearCounterclockwise,
        /// Counterclockwise, until the first wall edge
        EdgeCounterclockwise,
        /// Clockwise, away from the wall
        ClearClockwise,
        /// Clockwise, until the second wall edge
        EdgeClockwise,
    }

    impl SweepPhase {
        pub const SEQUENCE: [SweepPhase; 4] = [
            SweepPhase::ClearCounterclockwise,
            SweepPhase::EdgeCounterclockwise,
            SweepPhase::ClearClockwise,
            SweepPhase::EdgeClockwise,
        ];

        pub fn direction(self) -> RotationDirection {
            match self {
                SweepPhase::ClearCounterclockwise | SweepPhase::EdgeCounterclockwise => {
                    RotationDirection::Counterclockwise
                }
                SweepPhase::ClearClockwise | SweepPhase::EdgeClockwise => {
                    RotationDirection::Clockwise
                }
            }
        }

        /// Whether this phase ends on a wall edge rather than on open space
        pub fn seeks_wall(self) -> bool {
            matches!(
                self,
                SweepPhase::EdgeCounterclockwise | SweepPhase::EdgeClockwise
            )
        }
    }

    impl fmt::Display for SweepPhase {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                SweepPhase::ClearCounterclockwise => "counterclockwise clear sweep",
                SweepPhase::EdgeCounterclockwise => "counterclockwise edge sweep",
                SweepPhase::ClearClockwise => "clockwise clear sweep",
                SweepPhase::EdgeClockwise => "clockwise edge sweep",
            };
            f.write_str(name)
        }
    }

    /// Wrap an angle in degrees into [0, 360)
    pub fn normalize_degrees(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(360.0);
        // rem_euclid rounds tiny negative inputs up to exactly 360.0
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    }

    /// Signed turn in (-180, 180] taking heading `from` to heading `to`
    pub fn shortest_turn(from: f64, to: f64) -> f64 {
        let delta = normalize_degrees(to - from);
        if delta > 180.0 {
            delta - 360.0
        } else {
            delta
        }
    }

}
