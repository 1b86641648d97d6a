//! Decoder and encoder capabilities.

use std::path::Path;

use motionprobe_common::ProbeResult;
use motionprobe_model::Frame;

/// Decodes a source video into an ordered frame sequence.
///
/// A failure is reported as `ProbeError::UnreadableSource` and is fatal to
/// the whole run.
pub trait SourceFrameProvider: Send + Sync {
    fn decode(&self, path: &Path) -> ProbeResult<Vec<Frame>>;

    /// Check if this provider can run on the system.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// Persists a frame sequence. Frame count and order must be preserved exactly.
pub trait ClipEncoder: Send + Sync {
    fn encode(&self, frames: &[Frame], fps: f64, path: &Path) -> ProbeResult<()>;

    /// File extension of the produced clip, empty for directory outputs.
    fn extension(&self) -> &str;

    /// Check if this encoder can run on the system.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}
