//! Concurrent suite runner.
//!
//! Each clip is sampled, submitted to the backend, parsed, and scored.
//! Submissions run in parallel up to a fixed bound; a clip whose inference
//! fails after retries, times out, or whose task panics is degraded to an
//! all-UNKNOWN record instead of aborting the run. Records come back in
//! input order.

use std::sync::Arc;
use std::time::Duration;

use motionprobe_common::{HarnessConfig, ProbeError, ProbeResult};
use motionprobe_inference::{
    with_retry, InferenceAdapter, InferenceError, InferenceResult, PromptTemplate, RetryPolicy,
};
use motionprobe_model::{Frame, LabeledClip, ScoreRecord, SuiteResult};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::parser::parse_response;
use crate::sampler::sample_frames;
use crate::scoring::{aggregate, score, score_failure};

/// Knobs for one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Frames sampled from every clip.
    pub sample_count: usize,
    /// Maximum in-flight backend calls.
    pub concurrency: usize,
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            sample_count: 8,
            concurrency: 4,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

impl RunnerSettings {
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            sample_count: config.sampling.frame_count,
            concurrency: config.inference.concurrency,
            timeout: Duration::from_secs(config.inference.timeout_secs),
            retry: RetryPolicy::from_config(&config.inference),
        }
    }
}

/// A clip left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedClip {
    pub clip_id: String,
    pub reason: String,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteRun {
    /// One record per evaluated clip, in input order.
    pub records: Vec<ScoreRecord>,
    /// Clips too short to sample.
    pub excluded: Vec<ExcludedClip>,
    pub result: SuiteResult,
}

pub struct SuiteRunner {
    adapter: Arc<dyn InferenceAdapter>,
    prompt: PromptTemplate,
    settings: RunnerSettings,
}

impl SuiteRunner {
    pub fn new(
        adapter: Arc<dyn InferenceAdapter>,
        prompt: PromptTemplate,
        settings: RunnerSettings,
    ) -> ProbeResult<Self> {
        if settings.concurrency == 0 {
            return Err(ProbeError::config("concurrency must be at least 1"));
        }
        if settings.sample_count < 2 {
            return Err(ProbeError::config(format!(
                "sample count must be at least 2, got {}",
                settings.sample_count
            )));
        }
        if settings.timeout.is_zero() {
            return Err(ProbeError::config("inference timeout must be positive"));
        }
        Ok(Self {
            adapter,
            prompt,
            settings,
        })
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub fn adapter(&self) -> &dyn InferenceAdapter {
        self.adapter.as_ref()
    }

    /// Evaluate every clip and aggregate the results.
    pub async fn run(&self, clips: Vec<LabeledClip>) -> SuiteRun {
        info!(
            "Evaluating {} clips with {} ({}), {} frames each, concurrency {}",
            clips.len(),
            self.adapter.name(),
            self.adapter.model(),
            self.settings.sample_count,
            self.settings.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency));
        let mut pending = Vec::with_capacity(clips.len());
        let mut excluded = Vec::new();

        for clip in clips {
            let frames = match sample_frames(&clip, self.settings.sample_count) {
                Ok(frames) => frames,
                Err(e) => {
                    warn!(clip = clip.id(), "Excluding clip: {e}");
                    excluded.push(ExcludedClip {
                        clip_id: clip.id().to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let adapter = Arc::clone(&self.adapter);
            let semaphore = Arc::clone(&semaphore);
            let prompt = self.prompt.render(frames.len());
            let settings = self.settings;
            let handle = tokio::spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = semaphore.acquire_owned().await;
                infer(adapter.as_ref(), &frames, &prompt, &settings).await
            });
            pending.push((clip, handle));
        }

        let mut records = Vec::with_capacity(pending.len());
        for (clip, handle) in pending {
            let record = match handle.await {
                Ok(Ok(raw)) => {
                    let prediction = parse_response(&raw);
                    if !prediction.failures.is_empty() {
                        debug!(
                            clip = clip.id(),
                            "Unparsed fields: {:?}",
                            prediction.failures
                        );
                    }
                    ScoreRecord {
                        raw_response: Some(raw),
                        ..score(clip.id(), prediction, clip.ground_truth())
                    }
                }
                Ok(Err(e)) => {
                    warn!(clip = clip.id(), "Inference failed, scoring as UNKNOWN: {e}");
                    score_failure(clip.id(), clip.ground_truth(), e.to_string())
                }
                Err(e) => {
                    warn!(clip = clip.id(), "Inference task aborted, scoring as UNKNOWN: {e}");
                    score_failure(
                        clip.id(),
                        clip.ground_truth(),
                        format!("inference task aborted: {e}"),
                    )
                }
            };
            records.push(record);
        }

        let result = aggregate(&records);
        info!(
            "Run complete: {} scored, {} failed, {} excluded",
            result.scored,
            result.inference_failures,
            excluded.len()
        );

        SuiteRun {
            records,
            excluded,
            result,
        }
    }
}

/// One clip's inference: bounded retries, each attempt under the timeout.
async fn infer(
    adapter: &dyn InferenceAdapter,
    frames: &[Frame],
    prompt: &str,
    settings: &RunnerSettings,
) -> InferenceResult<String> {
    let timeout = settings.timeout;
    with_retry(&settings.retry, move |attempt| async move {
        debug!("Submitting {} frames (attempt {})", frames.len(), attempt + 1);
        match tokio::time::timeout(timeout, adapter.submit(frames, prompt)).await {
            Ok(reply) => reply,
            Err(_) => Err(InferenceError::Timeout(format!(
                "no reply within {:.1}s",
                timeout.as_secs_f64()
            ))),
        }
    })
    .await
}
