//! Camera-motion classes, directions, and motion specifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical camera-motion classes under test.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MotionClass {
    /// Camera rotates left/right on a fixed point.
    Pan,
    /// Camera rotates up/down on a fixed point.
    Tilt,
    /// Lens focal length change: one uniform scale.
    Zoom,
    /// Camera physically moves forward/backward: depth-dependent scale.
    Dolly,
    /// No camera movement.
    Static,
}

/// Direction of a camera motion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    In,
    Out,
    None,
}

impl MotionClass {
    pub const ALL: [MotionClass; 5] = [
        MotionClass::Pan,
        MotionClass::Tilt,
        MotionClass::Zoom,
        MotionClass::Dolly,
        MotionClass::Static,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionClass::Pan => "pan",
            MotionClass::Tilt => "tilt",
            MotionClass::Zoom => "zoom",
            MotionClass::Dolly => "dolly",
            MotionClass::Static => "static",
        }
    }

    /// Directions that are meaningful for this class.
    pub fn valid_directions(&self) -> &'static [Direction] {
        match self {
            MotionClass::Pan => &[Direction::Left, Direction::Right],
            MotionClass::Tilt => &[Direction::Up, Direction::Down],
            MotionClass::Zoom | MotionClass::Dolly => &[Direction::In, Direction::Out],
            MotionClass::Static => &[Direction::None],
        }
    }

    pub fn accepts(&self, direction: Direction) -> bool {
        self.valid_directions().contains(&direction)
    }
}

impl Direction {
    pub const ALL: [Direction; 7] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::In,
        Direction::Out,
        Direction::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::In => "in",
            Direction::Out => "out",
            Direction::None => "none",
        }
    }
}

impl fmt::Display for MotionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionClass {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MotionClass::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SpecError::UnknownLabel(s.to_string()))
    }
}

impl FromStr for Direction {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SpecError::UnknownLabel(s.to_string()))
    }
}

/// A complete description of one synthetic camera motion.
///
/// `speed` is pixels per second for PAN/TILT and a progress rate for
/// ZOOM/DOLLY, where 1.0 reaches `max_zoom` on the last frame.
/// `max_zoom` only affects ZOOM/DOLLY but must always be >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSpec {
    pub class: MotionClass,
    pub direction: Direction,
    pub speed: f64,
    #[serde(default = "unit_zoom")]
    pub max_zoom: f64,
}

fn unit_zoom() -> f64 {
    1.0
}

/// Why a motion spec was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
    #[error("Invalid spec: direction '{direction}' is not valid for {class}")]
    IncompatibleDirection {
        class: MotionClass,
        direction: Direction,
    },

    #[error("Invalid spec: speed must be > 0, got {0}")]
    NonPositiveSpeed(f64),

    #[error("Invalid spec: max zoom must be >= 1, got {0}")]
    MaxZoomBelowOne(f64),

    #[error("Unknown motion label: '{0}'")]
    UnknownLabel(String),
}

/// Speeds and zoom limits used to build the canonical suite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuiteKinematics {
    pub pan_speed: f64,
    pub tilt_speed: f64,
    pub zoom_speed: f64,
    pub zoom_max: f64,
    pub dolly_speed: f64,
    pub dolly_max: f64,
}

impl Default for SuiteKinematics {
    fn default() -> Self {
        Self {
            pan_speed: 50.0,
            tilt_speed: 30.0,
            zoom_speed: 1.0,
            zoom_max: 1.5,
            dolly_speed: 1.0,
            dolly_max: 1.5,
        }
    }
}

impl MotionSpec {
    /// Build and validate a spec.
    pub fn new(
        class: MotionClass,
        direction: Direction,
        speed: f64,
        max_zoom: f64,
    ) -> Result<Self, SpecError> {
        let spec = Self {
            class,
            direction,
            speed,
            max_zoom,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn pan(direction: Direction, speed: f64) -> Result<Self, SpecError> {
        Self::new(MotionClass::Pan, direction, speed, 1.0)
    }

    pub fn tilt(direction: Direction, speed: f64) -> Result<Self, SpecError> {
        Self::new(MotionClass::Tilt, direction, speed, 1.0)
    }

    pub fn zoom(direction: Direction, speed: f64, max_zoom: f64) -> Result<Self, SpecError> {
        Self::new(MotionClass::Zoom, direction, speed, max_zoom)
    }

    pub fn dolly(direction: Direction, speed: f64, max_zoom: f64) -> Result<Self, SpecError> {
        Self::new(MotionClass::Dolly, direction, speed, max_zoom)
    }

    /// The identity motion.
    pub fn stationary() -> Self {
        Self {
            class: MotionClass::Static,
            direction: Direction::None,
            speed: 1.0,
            max_zoom: 1.0,
        }
    }

    /// Check direction/class compatibility and numeric ranges.
    pub fn validate(&self) -> Result<(), SpecError> {
        if !self.class.accepts(self.direction) {
            return Err(SpecError::IncompatibleDirection {
                class: self.class,
                direction: self.direction,
            });
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(SpecError::NonPositiveSpeed(self.speed));
        }
        if !(self.max_zoom.is_finite() && self.max_zoom >= 1.0) {
            return Err(SpecError::MaxZoomBelowOne(self.max_zoom));
        }
        Ok(())
    }

    /// Stable label such as `pan_right` or `static`.
    pub fn label(&self) -> String {
        match self.direction {
            Direction::None => self.class.as_str().to_string(),
            direction => format!("{}_{}", self.class, direction),
        }
    }

    /// Parse a label such as `zoom_in` or `static` into class and direction.
    pub fn parse_label(label: &str) -> Result<(MotionClass, Direction), SpecError> {
        let label = label.trim();
        let (class, direction): (MotionClass, Direction) =
            match label.split_once(|c| c == '_' || c == '-') {
                Some((class, direction)) => (class.parse()?, direction.parse()?),
                None => (label.parse()?, Direction::None),
            };
        if !class.accepts(direction) {
            return Err(SpecError::IncompatibleDirection { class, direction });
        }
        Ok((class, direction))
    }

    /// Build a spec from a label using the speeds in `kinematics`.
    pub fn from_label(label: &str, kinematics: &SuiteKinematics) -> Result<Self, SpecError> {
        let (class, direction) = Self::parse_label(label)?;
        match class {
            MotionClass::Pan => Self::pan(direction, kinematics.pan_speed),
            MotionClass::Tilt => Self::tilt(direction, kinematics.tilt_speed),
            MotionClass::Zoom => Self::zoom(direction, kinematics.zoom_speed, kinematics.zoom_max),
            MotionClass::Dolly => {
                Self::dolly(direction, kinematics.dolly_speed, kinematics.dolly_max)
            }
            MotionClass::Static => Ok(Self::stationary()),
        }
    }

    /// Labels of the nine canonical clips, in suite order.
    pub const CANONICAL_LABELS: [&'static str; 9] = [
        "pan_right",
        "pan_left",
        "tilt_up",
        "tilt_down",
        "zoom_in",
        "zoom_out",
        "dolly_in",
        "dolly_out",
        "static",
    ];

    /// The nine canonical motions.
    pub fn canonical_suite(kinematics: &SuiteKinematics) -> Result<Vec<Self>, SpecError> {
        Self::CANONICAL_LABELS
            .iter()
            .map(|label| Self::from_label(label, kinematics))
            .collect()
    }
}
