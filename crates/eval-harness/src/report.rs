//! Persisted run reports and their console summary.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use motionprobe_common::{ProbeError, ProbeResult};
use motionprobe_model::{format_accuracy, ScoreRecord, SuiteResult};
use serde::{Deserialize, Serialize};

use crate::runner::{ExcludedClip, SuiteRun};

/// File name used when a report is written into a directory.
pub const REPORT_FILE: &str = "results.json";

/// A complete evaluation run as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub generated_at: String,
    pub backend: String,
    pub model: String,
    pub sample_count: usize,
    pub result: SuiteResult,
    pub records: Vec<ScoreRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ExcludedClip>,
}

impl SuiteReport {
    pub fn new(run: SuiteRun, backend: &str, model: &str, sample_count: usize) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            backend: backend.to_string(),
            model: model.to_string(),
            sample_count,
            result: run.result,
            records: run.records,
            excluded: run.excluded,
        }
    }

    /// Write pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Report saved");
        Ok(())
    }

    pub fn load(path: &Path) -> ProbeResult<Self> {
        if !path.exists() {
            return Err(ProbeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn mark(correct: bool) -> &'static str {
    if correct {
        "yes"
    } else {
        "no"
    }
}

fn accuracy_line(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    accuracy: Option<f64>,
    correct: usize,
    total: usize,
) -> fmt::Result {
    writeln!(
        f,
        "{:<20}{:>7} ({}/{})",
        format!("{name} accuracy:"),
        format_accuracy(accuracy),
        correct,
        total
    )
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = &self.result;
        writeln!(
            f,
            "Camera motion results: {} ({}), {} frames per clip",
            self.backend, self.model, self.sample_count
        )?;
        writeln!(f, "Generated {}", self.generated_at)?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<16} {:<12} {:<18} {:<7} {:<10} {}",
            "clip", "truth", "predicted", "motion", "direction", "full"
        )?;
        for record in &self.records {
            writeln!(
                f,
                "{:<16} {:<12} {:<18} {:<7} {:<10} {}",
                record.clip_id,
                record.ground_truth.label(),
                record.prediction.label(),
                mark(record.motion_correct),
                mark(record.direction_correct),
                mark(record.full_correct)
            )?;
            if let Some(error) = &record.inference_error {
                writeln!(f, "  inference failed: {error}")?;
            }
        }
        for clip in &self.excluded {
            writeln!(f, "{:<16} excluded: {}", clip.clip_id, clip.reason)?;
        }
        writeln!(f)?;

        accuracy_line(f, "Motion", result.motion_accuracy, result.motion_correct, result.total)?;
        accuracy_line(
            f,
            "Direction",
            result.direction_accuracy,
            result.direction_correct,
            result.total,
        )?;
        accuracy_line(f, "Full", result.full_accuracy, result.full_correct, result.total)?;
        writeln!(
            f,
            "Unknown fields: motion {}, direction {}, confidence {}, reasoning {}",
            result.unknown.motion,
            result.unknown.direction,
            result.unknown.confidence,
            result.unknown.reasoning
        )?;
        if result.inference_failures > 0 {
            writeln!(
                f,
                "Inference failures: {} of {}",
                result.inference_failures, result.total
            )?;
        }

        if !result.per_class.is_empty() {
            writeln!(f)?;
            writeln!(f, "Per class:")?;
            for (class, breakdown) in &result.per_class {
                writeln!(
                    f,
                    "  {:<8} motion {}/{}  direction {}/{}  full {}/{}",
                    class.as_str(),
                    breakdown.motion_correct,
                    breakdown.total,
                    breakdown.direction_correct,
                    breakdown.total,
                    breakdown.full_correct,
                    breakdown.total
                )?;
            }
        }
        Ok(())
    }
}
