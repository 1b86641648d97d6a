//! Lossless PNG sequences: one numbered image per frame in a directory.
//!
//! Used for bit-exact inspection and in tests where ffmpeg is unavailable.

use std::path::{Path, PathBuf};

use motionprobe_common::{ProbeError, ProbeResult};
use motionprobe_model::Frame;

use crate::codec::{ClipEncoder, SourceFrameProvider};

fn frame_file_name(index: usize) -> String {
    format!("frame_{index:05}.png")
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into the target directory.
#[derive(Debug, Clone, Default)]
pub struct PngSequenceEncoder;

impl ClipEncoder for PngSequenceEncoder {
    fn encode(&self, frames: &[Frame], _fps: f64, path: &Path) -> ProbeResult<()> {
        if frames.is_empty() {
            return Err(ProbeError::encode("Refusing to encode an empty clip"));
        }
        if path.exists() {
            std::fs::remove_dir_all(path)?;
        }
        std::fs::create_dir_all(path)?;

        for (i, frame) in frames.iter().enumerate() {
            let file = path.join(frame_file_name(i));
            frame
                .to_image()
                .save(&file)
                .map_err(|e| ProbeError::encode(format!("Failed to write {}: {e}", file.display())))?;
        }

        tracing::debug!(path = %path.display(), frames = frames.len(), "Wrote PNG sequence");
        Ok(())
    }

    fn extension(&self) -> &str {
        ""
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "png-sequence"
    }
}

/// Reads a directory of PNG frames in file-name order.
#[derive(Debug, Clone, Default)]
pub struct PngSequenceDecoder {
    /// Stop after this many frames.
    pub max_frames: Option<usize>,
}

impl PngSequenceDecoder {
    fn frame_paths(dir: &Path) -> ProbeResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| ProbeError::unreadable_source(dir, e.to_string()))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl SourceFrameProvider for PngSequenceDecoder {
    fn decode(&self, path: &Path) -> ProbeResult<Vec<Frame>> {
        let mut paths = Self::frame_paths(path)?;
        if paths.is_empty() {
            return Err(ProbeError::unreadable_source(path, "no PNG frames found"));
        }
        if let Some(max) = self.max_frames {
            paths.truncate(max);
        }

        paths
            .iter()
            .map(|p| {
                let img = image::open(p)
                    .map_err(|e| ProbeError::unreadable_source(p, e.to_string()))?;
                Frame::try_from(img.to_rgb8())
                    .map_err(|e| ProbeError::unreadable_source(p, e.to_string()))
            })
            .collect()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "png-sequence"
    }
}
