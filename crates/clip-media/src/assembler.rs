//! Clip assembly: encode labeled clips and record their ground truth.
//!
//! Labels travel only in the sidecar manifest, never in pixel data.

use std::path::{Path, PathBuf};

use motionprobe_common::{ProbeError, ProbeResult};
use motionprobe_model::{ClipEntry, ClipManifest, LabeledClip, MotionSpec};

use crate::codec::{ClipEncoder, SourceFrameProvider};

/// A clip persisted on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipHandle {
    pub id: String,
    pub path: PathBuf,
    pub frame_count: usize,
    pub ground_truth: MotionSpec,
}

/// Outcome of assembling a batch of clips.
#[derive(Debug)]
pub struct AssembledSuite {
    pub handles: Vec<ClipHandle>,
    pub manifest: ClipManifest,
    pub manifest_path: PathBuf,
    /// Clips that failed to encode, with the reason.
    pub failed: Vec<(String, ProbeError)>,
}

/// Encodes clips into one output directory.
pub struct ClipAssembler {
    output_dir: PathBuf,
    encoder: Box<dyn ClipEncoder>,
}

impl ClipAssembler {
    pub fn new(output_dir: impl Into<PathBuf>, encoder: Box<dyn ClipEncoder>) -> Self {
        Self {
            output_dir: output_dir.into(),
            encoder,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn encoder_name(&self) -> &str {
        self.encoder.name()
    }

    /// File (or directory) name a clip is written to.
    pub fn clip_file_name(&self, id: &str) -> String {
        match self.encoder.extension() {
            "" => id.to_string(),
            ext => format!("{id}.{ext}"),
        }
    }

    /// Encode one clip.
    pub fn assemble(&self, clip: &LabeledClip) -> ProbeResult<ClipHandle> {
        let path = self.output_dir.join(self.clip_file_name(clip.id()));
        self.encoder.encode(clip.frames(), clip.fps(), &path)?;
        tracing::info!(
            clip = clip.id(),
            frames = clip.frame_count(),
            path = %path.display(),
            "Assembled clip"
        );
        Ok(ClipHandle {
            id: clip.id().to_string(),
            path,
            frame_count: clip.frame_count(),
            ground_truth: *clip.ground_truth(),
        })
    }

    /// Encode every clip and write the manifest.
    ///
    /// A clip that fails to encode is left out of the manifest and reported
    /// in `failed`; the rest of the batch continues.
    pub fn assemble_all(&self, clips: &[LabeledClip]) -> ProbeResult<AssembledSuite> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut handles = Vec::with_capacity(clips.len());
        let mut failed = Vec::new();
        for clip in clips {
            match self.assemble(clip) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(clip = clip.id(), "Failed to encode clip: {e}");
                    failed.push((clip.id().to_string(), e));
                }
            }
        }

        let (fps, width, height) = clips
            .iter()
            .find_map(|c| c.dimensions().map(|(w, h)| (c.fps(), w, h)))
            .unwrap_or((0.0, 0, 0));
        let manifest = build_manifest(&handles, fps, width, height);
        let manifest_path = manifest
            .save(&self.output_dir)
            .map_err(|e| ProbeError::Other(e.into()))?;

        Ok(AssembledSuite {
            handles,
            manifest,
            manifest_path,
            failed,
        })
    }
}

/// Build a manifest whose file entries are relative to the clip directory.
pub fn build_manifest(handles: &[ClipHandle], fps: f64, width: u32, height: u32) -> ClipManifest {
    let mut manifest = ClipManifest::new(fps, width, height);
    for handle in handles {
        let file = handle
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| handle.id.clone());
        manifest.insert(
            handle.id.clone(),
            ClipEntry {
                file,
                frame_count: handle.frame_count,
                ground_truth: handle.ground_truth,
            },
        );
    }
    manifest
}

/// Clips read back from a directory written by [`ClipAssembler::assemble_all`].
#[derive(Debug)]
pub struct LoadedSuite {
    /// Clips in manifest (id) order.
    pub clips: Vec<LabeledClip>,
    /// Clips listed in the manifest that could not be decoded.
    pub failed: Vec<(String, ProbeError)>,
}

/// Decode every clip listed in the directory's manifest.
///
/// A missing or corrupt manifest is an error. A clip whose file cannot be
/// decoded, or decodes to a different frame count than the manifest lists,
/// is reported in `failed` and the rest still load.
pub fn load_suite(dir: &Path, provider: &dyn SourceFrameProvider) -> ProbeResult<LoadedSuite> {
    let manifest = ClipManifest::load(dir).map_err(|e| ProbeError::Other(e.into()))?;
    tracing::info!(
        dir = %dir.display(),
        clips = manifest.len(),
        provider = provider.name(),
        "Loading clip suite"
    );

    let mut clips = Vec::with_capacity(manifest.len());
    let mut failed = Vec::new();
    for (id, entry) in &manifest.clips {
        let path = dir.join(&entry.file);
        let decoded = provider.decode(&path).and_then(|frames| {
            if frames.len() == entry.frame_count {
                Ok(frames)
            } else {
                Err(ProbeError::FrameCountMismatch {
                    path,
                    expected: entry.frame_count,
                    found: frames.len(),
                })
            }
        });
        match decoded {
            Ok(frames) => {
                clips.push(LabeledClip::new(id.clone(), frames, entry.ground_truth, manifest.fps));
            }
            Err(e) => {
                tracing::warn!(clip = id.as_str(), "Failed to load clip: {e}");
                failed.push((id.clone(), e));
            }
        }
    }

    Ok(LoadedSuite { clips, failed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SourceFrameProvider;
    use crate::png_sequence::{PngSequenceDecoder, PngSequenceEncoder};
    use motionprobe_model::{Direction, Frame};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "motionprobe-assembler-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn clip(id: &str, spec: MotionSpec, frames: usize) -> LabeledClip {
        let frames = (0..frames)
            .map(|i| Frame::solid(4, 2, [i as u8, 0, 0]).unwrap())
            .collect();
        LabeledClip::new(id, frames, spec, 30.0)
    }

    #[test]
    fn writes_clips_and_manifest() {
        let dir = temp_dir("suite");
        let assembler = ClipAssembler::new(&dir, Box::new(PngSequenceEncoder));
        let clips = vec![
            clip("static", MotionSpec::stationary(), 3),
            clip("pan_left", MotionSpec::pan(Direction::Left, 50.0).unwrap(), 5),
        ];

        let suite = assembler.assemble_all(&clips).unwrap();
        assert!(suite.failed.is_empty());
        assert_eq!(suite.handles.len(), 2);

        let manifest = ClipManifest::load(&dir).unwrap();
        assert_eq!(manifest, suite.manifest);
        assert_eq!((manifest.width, manifest.height), (4, 2));
        let entry = manifest.get("pan_left").unwrap();
        assert_eq!(entry.file, "pan_left");
        assert_eq!(entry.frame_count, 5);
        assert_eq!(entry.ground_truth, MotionSpec::pan(Direction::Left, 50.0).unwrap());
        assert!(manifest.validate_files(&dir).is_empty());

        let decoded = PngSequenceDecoder::default()
            .decode(&dir.join(&entry.file))
            .unwrap();
        assert_eq!(decoded, clips[1].frames());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn encode_failure_is_isolated() {
        let dir = temp_dir("isolated");
        let assembler = ClipAssembler::new(&dir, Box::new(PngSequenceEncoder));
        let clips = vec![
            clip("empty", MotionSpec::stationary(), 0),
            clip("zoom_in", MotionSpec::zoom(Direction::In, 1.0, 1.5).unwrap(), 2),
        ];

        let suite = assembler.assemble_all(&clips).unwrap();
        assert_eq!(suite.failed.len(), 1);
        assert_eq!(suite.failed[0].0, "empty");
        assert!(suite.manifest.get("zoom_in").is_some());
        assert!(suite.manifest.get("empty").is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loads_suite_back_in_id_order() {
        let dir = temp_dir("load");
        let assembler = ClipAssembler::new(&dir, Box::new(PngSequenceEncoder));
        let clips = vec![
            clip("tilt_up", MotionSpec::tilt(Direction::Up, 30.0).unwrap(), 4),
            clip("pan_right", MotionSpec::pan(Direction::Right, 50.0).unwrap(), 3),
        ];
        assembler.assemble_all(&clips).unwrap();
        std::fs::remove_dir_all(dir.join("tilt_up")).unwrap();

        let loaded = load_suite(&dir, &PngSequenceDecoder::default()).unwrap();
        assert_eq!(loaded.clips.len(), 1);
        assert_eq!(loaded.clips[0], clips[1]);
        assert_eq!(loaded.failed.len(), 1);
        assert_eq!(loaded.failed[0].0, "tilt_up");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn frame_count_mismatch_is_not_scored() {
        let dir = temp_dir("mismatch");
        let assembler = ClipAssembler::new(&dir, Box::new(PngSequenceEncoder));
        let clips = vec![
            clip("static", MotionSpec::stationary(), 4),
            clip("pan_left", MotionSpec::pan(Direction::Left, 50.0).unwrap(), 3),
        ];
        assembler.assemble_all(&clips).unwrap();

        let mut manifest = ClipManifest::load(&dir).unwrap();
        manifest.clips.get_mut("static").unwrap().frame_count = 6;
        manifest.save(&dir).unwrap();

        let loaded = load_suite(&dir, &PngSequenceDecoder::default()).unwrap();
        assert_eq!(loaded.clips.len(), 1);
        assert_eq!(loaded.clips[0].id(), "pan_left");
        assert_eq!(loaded.failed.len(), 1);
        assert_eq!(loaded.failed[0].0, "static");
        assert!(matches!(
            loaded.failed[0].1,
            ProbeError::FrameCountMismatch {
                expected: 6,
                found: 4,
                ..
            }
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = temp_dir("no-manifest");
        assert!(load_suite(&dir, &PngSequenceDecoder::default()).is_err());
    }

    #[test]
    fn file_names_follow_encoder_extension() {
        let assembler = ClipAssembler::new("out", Box::new(crate::ffmpeg::FfmpegEncoder::default()));
        assert_eq!(assembler.clip_file_name("dolly_out"), "dolly_out.mp4");
    }
}
