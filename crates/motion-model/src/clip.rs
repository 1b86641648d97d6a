//! Labeled clips: generated frames bound to their ground truth.

use std::sync::Arc;

use crate::frame::Frame;
use crate::motion::MotionSpec;

/// An ordered frame sequence and the motion that produced it.
///
/// Immutable once assembled; clones share the frame list.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledClip {
    id: String,
    frames: Arc<[Frame]>,
    ground_truth: MotionSpec,
    fps: f64,
}

impl LabeledClip {
    pub fn new(id: impl Into<String>, frames: Vec<Frame>, ground_truth: MotionSpec, fps: f64) -> Self {
        Self {
            id: id.into(),
            frames: frames.into(),
            ground_truth,
            fps,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn ground_truth(&self) -> &MotionSpec {
        &self.ground_truth
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Width and height of the first frame, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(|f| (f.width(), f.height()))
    }
}
