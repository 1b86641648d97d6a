use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use motionprobe_eval::{RunnerSettings, SuiteReport, SuiteRunner};
use motionprobe_inference::{InferenceAdapter, InferenceError, InferenceResult, PromptTemplate, RetryPolicy};
use motionprobe_model::{Direction, Frame, LabeledClip, MotionClass, MotionSpec, SuiteKinematics};
use motionprobe_transform::{GenerateOptions, MotionTransformEngine};

fn fingerprint(frame: &Frame) -> u64 {
    let mut hasher = DefaultHasher::new();
    frame.pixels().hash(&mut hasher);
    hasher.finish()
}

/// Answers by looking up the last submitted frame.
struct Oracle {
    replies: HashMap<u64, InferenceResult<String>>,
    calls: AtomicUsize,
}

impl Oracle {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn answer(&mut self, clip: &LabeledClip, reply: InferenceResult<String>) {
        let last = clip.frames().last().expect("clip has frames");
        self.replies.insert(fingerprint(last), reply);
    }
}

#[async_trait::async_trait]
impl InferenceAdapter for Oracle {
    async fn submit(&self, frames: &[Frame], _prompt: &str) -> InferenceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = frames.last().ok_or_else(|| InferenceError::Config("no frames".into()))?;
        self.replies
            .get(&fingerprint(last))
            .cloned()
            .unwrap_or_else(|| Err(InferenceError::InvalidResponse("unknown clip".into())))
    }

    fn name(&self) -> &str {
        "oracle"
    }

    fn model(&self) -> &str {
        "oracle-1"
    }
}

/// Tracks the highest number of simultaneous calls.
struct Gauge {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait::async_trait]
impl InferenceAdapter for Gauge {
    async fn submit(&self, _frames: &[Frame], _prompt: &str) -> InferenceResult<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok("MOTION_TYPE: static\nDIRECTION: none".to_string())
    }

    fn name(&self) -> &str {
        "gauge"
    }

    fn model(&self) -> &str {
        "gauge"
    }
}

struct Stalled;

#[async_trait::async_trait]
impl InferenceAdapter for Stalled {
    async fn submit(&self, _frames: &[Frame], _prompt: &str) -> InferenceResult<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("MOTION_TYPE: pan".to_string())
    }

    fn name(&self) -> &str {
        "stalled"
    }

    fn model(&self) -> &str {
        "stalled"
    }
}

struct Panicking;

#[async_trait::async_trait]
impl InferenceAdapter for Panicking {
    async fn submit(&self, _frames: &[Frame], _prompt: &str) -> InferenceResult<String> {
        panic!("backend client bug");
    }

    fn name(&self) -> &str {
        "panicking"
    }

    fn model(&self) -> &str {
        "panicking"
    }
}

fn textured_source(frames: usize) -> Vec<Frame> {
    let (width, height) = (48u32, 32u32);
    (0..frames)
        .map(|i| {
            let mut pixels = Vec::with_capacity((width * height * 3) as usize);
            for y in 0..height {
                for x in 0..width {
                    pixels.push((x * 5 + i as u32) as u8);
                    pixels.push((y * 7) as u8);
                    pixels.push(((x * y) % 251) as u8);
                }
            }
            Frame::from_rgb(width, height, pixels).expect("valid frame")
        })
        .collect()
}

fn canonical_clips() -> Vec<LabeledClip> {
    let specs = MotionSpec::canonical_suite(&SuiteKinematics::default()).expect("suite");
    let engine = MotionTransformEngine::new(GenerateOptions {
        frame_count: Some(10),
        ..Default::default()
    });
    engine
        .generate_batch(&textured_source(10), &specs)
        .into_iter()
        .map(|r| r.expect("clip generates"))
        .collect()
}

fn fast_settings() -> RunnerSettings {
    RunnerSettings {
        sample_count: 8,
        concurrency: 3,
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
        },
    }
}

fn labeled_reply(motion: &str, direction: &str) -> InferenceResult<String> {
    Ok(format!(
        "MOTION_TYPE: {motion}\nDIRECTION: {direction}\nCONFIDENCE: high\nREASONING: test"
    ))
}

#[tokio::test]
async fn canonical_suite_end_to_end() {
    let clips = canonical_clips();
    let mut oracle = Oracle::new();
    for clip in &clips {
        let truth = clip.ground_truth();
        let reply = match clip.id() {
            // Right class, wrong direction.
            "pan_right" | "pan_left" => labeled_reply("pan", "up"),
            // Zoom mistaken for dolly, direction still right.
            "zoom_in" => labeled_reply("dolly", "in"),
            _ => labeled_reply(truth.class.as_str(), truth.direction.as_str()),
        };
        oracle.answer(clip, reply);
    }
    assert_eq!(oracle.replies.len(), 9, "every canonical clip ends on a distinct frame");

    let oracle = Arc::new(oracle);
    let runner = SuiteRunner::new(oracle.clone(), PromptTemplate::General, fast_settings())
        .expect("valid settings");
    let run = runner.run(clips).await;

    let ids: Vec<&str> = run.records.iter().map(|r| r.clip_id.as_str()).collect();
    assert_eq!(ids, MotionSpec::CANONICAL_LABELS.to_vec());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 9);

    let result = &run.result;
    assert_eq!((result.total, result.scored), (9, 9));
    assert_eq!(result.motion_correct, 8);
    assert_eq!(result.direction_correct, 7);
    assert_eq!(result.full_correct, 6);
    assert_eq!(result.per_class[&MotionClass::Zoom].motion_correct, 1);
    assert_eq!(result.per_class[&MotionClass::Pan].direction_correct, 0);

    let report = SuiteReport::new(run, "oracle", "oracle-1", 8);
    let text = report.to_string();
    assert!(text.contains("88.9% (8/9)"));
    assert!(text.contains("77.8% (7/9)"));
    assert!(text.contains("66.7% (6/9)"));
}

#[tokio::test]
async fn failed_calls_degrade_to_unknown() {
    let clips = canonical_clips();
    let mut oracle = Oracle::new();
    for clip in &clips {
        let truth = clip.ground_truth();
        let reply = if truth.class == MotionClass::Dolly {
            Err(InferenceError::Transport("connection reset".into()))
        } else {
            labeled_reply(truth.class.as_str(), truth.direction.as_str())
        };
        oracle.answer(clip, reply);
    }

    let oracle = Arc::new(oracle);
    let runner = SuiteRunner::new(oracle.clone(), PromptTemplate::Detailed, fast_settings())
        .expect("valid settings");
    let run = runner.run(clips).await;

    assert_eq!(run.result.total, 9);
    assert_eq!(run.result.inference_failures, 2);
    assert_eq!(run.result.full_correct, 7);
    assert_eq!(run.result.unknown.motion, 2);
    // Transport errors are retried once each.
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 11);

    let dolly_in = run
        .records
        .iter()
        .find(|r| r.clip_id == "dolly_in")
        .expect("record kept");
    assert!(dolly_in.prediction.is_unknown());
    assert!(dolly_in
        .inference_error
        .as_deref()
        .is_some_and(|e| e.contains("connection reset")));
}

#[tokio::test]
async fn short_clips_are_excluded_not_scored() {
    let clips = vec![
        LabeledClip::new("short", textured_source(3), MotionSpec::stationary(), 30.0),
        LabeledClip::new(
            "long",
            textured_source(8),
            MotionSpec::pan(Direction::Left, 50.0).expect("valid"),
            30.0,
        ),
    ];
    let gauge = Arc::new(Gauge {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let runner = SuiteRunner::new(gauge, PromptTemplate::Binary, fast_settings()).expect("valid");
    let run = runner.run(clips).await;

    assert_eq!(run.records.len(), 1);
    assert_eq!(run.records[0].clip_id, "long");
    assert_eq!(run.excluded.len(), 1);
    assert_eq!(run.excluded[0].clip_id, "short");
    assert!(run.excluded[0].reason.contains("Insufficient frames"));
    assert_eq!(run.result.total, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_bound_is_respected() {
    let clips: Vec<LabeledClip> = (0..12)
        .map(|i| {
            LabeledClip::new(
                format!("static-{i}"),
                textured_source(8),
                MotionSpec::stationary(),
                30.0,
            )
        })
        .collect();
    let gauge = Arc::new(Gauge {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let settings = RunnerSettings {
        concurrency: 2,
        ..fast_settings()
    };
    let runner = SuiteRunner::new(gauge.clone(), PromptTemplate::General, settings).expect("valid");
    let run = runner.run(clips).await;

    assert_eq!(run.result.full_correct, 12);
    let peak = gauge.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak in-flight calls was {peak}");
}

#[tokio::test]
async fn timeouts_are_retried_then_degraded() {
    let clips = vec![LabeledClip::new(
        "pan_right",
        textured_source(8),
        MotionSpec::pan(Direction::Right, 50.0).expect("valid"),
        30.0,
    )];
    let settings = RunnerSettings {
        timeout: Duration::from_millis(50),
        ..fast_settings()
    };
    let runner = SuiteRunner::new(Arc::new(Stalled), PromptTemplate::General, settings).expect("valid");
    let run = runner.run(clips).await;

    assert_eq!(run.result.inference_failures, 1);
    let error = run.records[0].inference_error.as_deref().unwrap_or_default();
    assert!(error.starts_with("Timeout"), "unexpected error: {error}");
}

#[tokio::test]
async fn panicking_backend_does_not_abort_the_run() {
    let clips = vec![
        LabeledClip::new("a", textured_source(8), MotionSpec::stationary(), 30.0),
        LabeledClip::new("b", textured_source(9), MotionSpec::stationary(), 30.0),
    ];
    let runner = SuiteRunner::new(Arc::new(Panicking), PromptTemplate::General, fast_settings())
        .expect("valid");
    let run = runner.run(clips).await;

    assert_eq!(run.records.len(), 2);
    assert_eq!(run.result.inference_failures, 2);
    assert_eq!(run.result.motion_accuracy, Some(0.0));
}
