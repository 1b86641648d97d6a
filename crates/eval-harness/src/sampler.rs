//! Evenly spaced frame sampling.
//!
//! Index `i` of `n` is `round(i * (T - 1) / (n - 1))` with halves rounded
//! up, computed in integers so a given `(T, n)` always yields the same
//! indices. The first and last frame are always included.

use motionprobe_model::{Frame, LabeledClip};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("Insufficient frames: clip has {available}, {requested} requested")]
    InsufficientFrames { available: usize, requested: usize },

    #[error("Sample count must be >= 2, got {0}")]
    InvalidSampleCount(usize),
}

/// `n` strictly increasing indices spanning `[0, total)`.
pub fn sample_indices(total: usize, n: usize) -> Result<Vec<usize>, SampleError> {
    if n < 2 {
        return Err(SampleError::InvalidSampleCount(n));
    }
    if total < n {
        return Err(SampleError::InsufficientFrames {
            available: total,
            requested: n,
        });
    }

    let span = total - 1;
    let steps = n - 1;
    Ok((0..n)
        .map(|i| (2 * i * span + steps) / (2 * steps))
        .collect())
}

/// Sample indices for a clip.
pub fn sample(clip: &LabeledClip, n: usize) -> Result<Vec<usize>, SampleError> {
    sample_indices(clip.frame_count(), n)
}

/// The sampled frames themselves, in order. Frames are shared, not copied.
pub fn sample_frames(clip: &LabeledClip, n: usize) -> Result<Vec<Frame>, SampleError> {
    let indices = sample(clip, n)?;
    Ok(indices.iter().map(|&i| clip.frames()[i].clone()).collect())
}
