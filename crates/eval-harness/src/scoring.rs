//! Scoring predictions against ground truth and aggregating suite results.
//!
//! Aggregation is a pure reduction: every record becomes a [`Tally`] and
//! tallies merge associatively, so partial results computed on any split of
//! the records combine into the same [`SuiteResult`].

use std::collections::BTreeMap;

use motionprobe_model::{
    ClassBreakdown, MotionClass, MotionSpec, Prediction, ScoreRecord, SuiteResult, UnknownCounts,
};

/// Compare one prediction with its ground truth.
///
/// Direction is judged on its own, so a right direction under a wrong
/// motion class still counts toward direction accuracy.
pub fn score(clip_id: &str, prediction: Prediction, ground_truth: &MotionSpec) -> ScoreRecord {
    let motion_correct = prediction.motion == Some(ground_truth.class);
    let direction_correct = prediction.direction == Some(ground_truth.direction);

    ScoreRecord {
        clip_id: clip_id.to_string(),
        ground_truth: *ground_truth,
        prediction,
        motion_correct,
        direction_correct,
        full_correct: motion_correct && direction_correct,
        inference_error: None,
        raw_response: None,
    }
}

/// Record for a clip whose inference failed: scored as an all-UNKNOWN miss.
pub fn score_failure(clip_id: &str, ground_truth: &MotionSpec, error: impl Into<String>) -> ScoreRecord {
    ScoreRecord {
        inference_error: Some(error.into()),
        ..score(clip_id, Prediction::unknown(), ground_truth)
    }
}

/// Partial counts over some subset of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tally {
    pub total: usize,
    pub scored: usize,
    pub inference_failures: usize,
    pub motion_correct: usize,
    pub direction_correct: usize,
    pub full_correct: usize,
    pub unknown: UnknownCounts,
    pub per_class: BTreeMap<MotionClass, ClassBreakdown>,
}

fn count(flag: bool) -> usize {
    usize::from(flag)
}

fn ratio(part: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| part as f64 / total as f64)
}

impl Tally {
    /// Tally of a single record.
    pub fn of(record: &ScoreRecord) -> Self {
        let prediction = &record.prediction;
        let breakdown = ClassBreakdown {
            total: 1,
            motion_correct: count(record.motion_correct),
            direction_correct: count(record.direction_correct),
            full_correct: count(record.full_correct),
        };

        Self {
            total: 1,
            scored: count(record.was_scored()),
            inference_failures: count(!record.was_scored()),
            motion_correct: breakdown.motion_correct,
            direction_correct: breakdown.direction_correct,
            full_correct: breakdown.full_correct,
            unknown: UnknownCounts {
                motion: count(prediction.motion.is_none()),
                direction: count(prediction.direction.is_none()),
                confidence: count(prediction.confidence.is_none()),
                reasoning: count(prediction.reasoning.is_none()),
            },
            per_class: BTreeMap::from([(record.ground_truth.class, breakdown)]),
        }
    }

    /// Combine two tallies. Associative and commutative.
    pub fn merge(mut self, other: Tally) -> Tally {
        self.total += other.total;
        self.scored += other.scored;
        self.inference_failures += other.inference_failures;
        self.motion_correct += other.motion_correct;
        self.direction_correct += other.direction_correct;
        self.full_correct += other.full_correct;
        self.unknown.motion += other.unknown.motion;
        self.unknown.direction += other.unknown.direction;
        self.unknown.confidence += other.unknown.confidence;
        self.unknown.reasoning += other.unknown.reasoning;

        for (class, theirs) in other.per_class {
            let ours = self.per_class.entry(class).or_default();
            ours.total += theirs.total;
            ours.motion_correct += theirs.motion_correct;
            ours.direction_correct += theirs.direction_correct;
            ours.full_correct += theirs.full_correct;
        }
        self
    }

    pub fn finish(self) -> SuiteResult {
        SuiteResult {
            total: self.total,
            scored: self.scored,
            inference_failures: self.inference_failures,
            motion_correct: self.motion_correct,
            direction_correct: self.direction_correct,
            full_correct: self.full_correct,
            motion_accuracy: ratio(self.motion_correct, self.total),
            direction_accuracy: ratio(self.direction_correct, self.total),
            full_accuracy: ratio(self.full_correct, self.total),
            unknown: self.unknown,
            per_class: self.per_class,
        }
    }
}

/// Aggregate records into a suite result. Accuracies are `None` for an
/// empty suite.
pub fn aggregate(records: &[ScoreRecord]) -> SuiteResult {
    records
        .iter()
        .map(Tally::of)
        .fold(Tally::default(), Tally::merge)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use motionprobe_model::{Direction, SuiteKinematics};
    use proptest::prelude::*;

    fn predict(motion: MotionClass, direction: Direction) -> Prediction {
        Prediction {
            motion: Some(motion),
            direction: Some(direction),
            confidence: Some(0.8),
            reasoning: Some("looks like it".into()),
            failures: Vec::new(),
        }
    }

    fn nine_records() -> Vec<ScoreRecord> {
        let suite = MotionSpec::canonical_suite(&SuiteKinematics::default()).unwrap();
        suite
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let prediction = match i {
                    // pan_right and pan_left answered as pan_up.
                    0 | 1 => predict(spec.class, Direction::Up),
                    // tilt_up answered as static with direction up.
                    2 => predict(MotionClass::Static, spec.direction),
                    _ => predict(spec.class, spec.direction),
                };
                score(&spec.label(), prediction, spec)
            })
            .collect()
    }

    #[test]
    fn direction_is_independent_of_motion() {
        let truth = MotionSpec::zoom(Direction::In, 1.0, 1.5).unwrap();
        let record = score("zoom_in", predict(MotionClass::Dolly, Direction::In), &truth);
        assert!(!record.motion_correct);
        assert!(record.direction_correct);
        assert!(!record.full_correct);
    }

    #[test]
    fn unknown_fields_are_wrong() {
        let truth = MotionSpec::stationary();
        let record = score("static", Prediction::unknown(), &truth);
        assert!(!record.motion_correct && !record.direction_correct && !record.full_correct);
    }

    #[test]
    fn nine_clip_suite() {
        let records = nine_records();
        let result = aggregate(&records);
        assert_eq!(result.total, 9);
        assert_eq!(result.motion_correct, 8);
        assert_eq!(result.direction_correct, 7);
        assert_eq!(result.full_correct, 6);
        assert!((result.motion_accuracy.unwrap() - 8.0 / 9.0).abs() < 1e-12);
        assert!((result.direction_accuracy.unwrap() - 7.0 / 9.0).abs() < 1e-12);
        assert!((result.full_accuracy.unwrap() - 6.0 / 9.0).abs() < 1e-12);

        let class_totals: usize = result.per_class.values().map(|b| b.total).sum();
        assert_eq!(class_totals, 9);
        assert_eq!(result.per_class[&MotionClass::Static].total, 1);
    }

    #[test]
    fn empty_suite_has_undefined_accuracy() {
        let result = aggregate(&[]);
        assert_eq!(result.total, 0);
        assert_eq!(result.motion_accuracy, None);
        assert_eq!(result.direction_accuracy, None);
        assert_eq!(result.full_accuracy, None);
        assert!(result.per_class.is_empty());
    }

    #[test]
    fn failures_count_as_unknown_misses() {
        let truth = MotionSpec::pan(Direction::Left, 4.0).unwrap();
        let records = vec![
            score("pan_left", predict(MotionClass::Pan, Direction::Left), &truth),
            score_failure("pan_left-2", &truth, "Timeout: no reply"),
        ];
        let result = aggregate(&records);
        assert_eq!(result.total, 2);
        assert_eq!(result.scored, 1);
        assert_eq!(result.inference_failures, 1);
        assert_eq!(result.motion_accuracy, Some(0.5));
        assert_eq!(result.unknown.motion, 1);
        assert_eq!(result.unknown.reasoning, 1);
    }

    proptest! {
        #[test]
        fn any_split_aggregates_the_same(split in 0usize..=9) {
            let records = nine_records();
            let (left, right) = records.split_at(split);
            let fold = |part: &[ScoreRecord]| {
                part.iter().map(Tally::of).fold(Tally::default(), Tally::merge)
            };
            let merged = fold(right).merge(fold(left)).finish();
            prop_assert_eq!(merged, aggregate(&records));
        }
    }
}
