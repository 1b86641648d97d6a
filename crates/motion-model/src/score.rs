//! Per-clip score records and suite-level results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::motion::{MotionClass, MotionSpec};
use crate::prediction::Prediction;

/// The comparison of one prediction against its ground truth.
///
/// Built by the scoring engine; `direction_correct` is evaluated
/// independently of `motion_correct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub clip_id: String,
    pub ground_truth: MotionSpec,
    pub prediction: Prediction,
    pub motion_correct: bool,
    pub direction_correct: bool,
    pub full_correct: bool,

    /// Set when inference failed and the prediction was degraded to UNKNOWN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_error: Option<String>,

    /// The backend's raw reply, when one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ScoreRecord {
    /// Whether a real backend answer was scored (as opposed to a degraded failure).
    pub fn was_scored(&self) -> bool {
        self.inference_error.is_none()
    }
}

/// Per ground-truth class breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassBreakdown {
    pub total: usize,
    pub motion_correct: usize,
    pub direction_correct: usize,
    pub full_correct: usize,
}

/// UNKNOWN counts per prediction field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnknownCounts {
    pub motion: usize,
    pub direction: usize,
    pub confidence: usize,
    pub reasoning: usize,
}

/// Aggregate accuracy over a set of score records.
///
/// Accuracies are `None` (undefined) when no records were processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    /// Records processed, including degraded inference failures.
    pub total: usize,
    /// Records backed by a real backend answer.
    pub scored: usize,
    /// Records whose inference failed and were counted as UNKNOWN.
    pub inference_failures: usize,
    pub motion_correct: usize,
    pub direction_correct: usize,
    pub full_correct: usize,
    pub motion_accuracy: Option<f64>,
    pub direction_accuracy: Option<f64>,
    pub full_accuracy: Option<f64>,
    pub unknown: UnknownCounts,
    pub per_class: BTreeMap<MotionClass, ClassBreakdown>,
}

/// Format an optional ratio as a percentage, `N/A` when undefined.
pub fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(value) => format!("{:.1}%", value * 100.0),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Direction;

    #[test]
    fn format_accuracy_handles_undefined() {
        assert_eq!(format_accuracy(None), "N/A");
        assert_eq!(format_accuracy(Some(8.0 / 9.0)), "88.9%");
    }

    #[test]
    fn record_without_error_was_scored() {
        let record = ScoreRecord {
            clip_id: "pan_left".to_string(),
            ground_truth: MotionSpec::pan(Direction::Left, 50.0).unwrap(),
            prediction: Prediction::unknown(),
            motion_correct: false,
            direction_correct: false,
            full_correct: false,
            inference_error: None,
            raw_response: Some(String::new()),
        };
        assert!(record.was_scored());
    }

    #[test]
    fn undefined_accuracy_serializes_as_null() {
        let result = SuiteResult {
            total: 0,
            scored: 0,
            inference_failures: 0,
            motion_correct: 0,
            direction_correct: 0,
            full_correct: 0,
            motion_accuracy: None,
            direction_accuracy: None,
            full_accuracy: None,
            unknown: UnknownCounts::default(),
            per_class: BTreeMap::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["motion_accuracy"].is_null());
        assert!(json["full_accuracy"].is_null());
    }
}
