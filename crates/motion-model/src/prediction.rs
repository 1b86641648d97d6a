//! Structured predictions recovered from backend free text.
//!
//! Every field is optional: `None` means UNKNOWN. A prediction never fails
//! to exist, so a missing or garbled answer is still counted as a miss.

use serde::{Deserialize, Serialize};

use crate::motion::{Direction, MotionClass};

/// One of the four labeled fields the response grammar expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionField {
    Motion,
    Direction,
    Confidence,
    Reasoning,
}

/// Why a field degraded to UNKNOWN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseFailure {
    /// The field label never appeared.
    Missing { field: PredictionField },
    /// The label appeared but its value matched nothing in the vocabulary.
    Unrecognized { field: PredictionField, value: String },
}

impl ParseFailure {
    pub fn field(&self) -> PredictionField {
        match self {
            ParseFailure::Missing { field } | ParseFailure::Unrecognized { field, .. } => *field,
        }
    }
}

/// A backend's answer for one clip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prediction {
    pub motion: Option<MotionClass>,
    pub direction: Option<Direction>,
    /// Confidence in `[0, 1]`.
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
    /// Per-field parse failures, in field order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ParseFailure>,
}

impl Prediction {
    /// A prediction with every field UNKNOWN.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether no field could be recovered.
    pub fn is_unknown(&self) -> bool {
        self.motion.is_none()
            && self.direction.is_none()
            && self.confidence.is_none()
            && self.reasoning.is_none()
    }

    /// Label in the same shape as a ground-truth label, e.g. `zoom_out`.
    pub fn label(&self) -> String {
        let motion = self.motion.map_or("unknown", |m| m.as_str());
        match self.direction {
            Some(Direction::None) => motion.to_string(),
            Some(direction) => format!("{motion}_{direction}"),
            None => format!("{motion}_unknown"),
        }
    }
}
