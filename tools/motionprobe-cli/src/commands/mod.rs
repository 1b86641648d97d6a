pub mod check;
pub mod generate;
pub mod parse;
pub mod run;
pub mod synth;
pub mod validate;

use std::path::Path;

use clap::ValueEnum;
use motionprobe_common::{BorderMode, GenerationDefaults};
use motionprobe_media::{
    ClipEncoder, FfmpegDecoder, FfmpegEncoder, PngSequenceDecoder, PngSequenceEncoder,
    SourceFrameProvider,
};
use motionprobe_model::SuiteKinematics;

/// How clips are written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClipFormat {
    /// H.264 MP4 via ffmpeg
    Mp4,
    /// Directory of numbered lossless PNGs
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BorderArg {
    /// Fill with the configured constant colour
    Constant,
    /// Replicate edge pixels
    Clamp,
}

impl From<BorderArg> for BorderMode {
    fn from(arg: BorderArg) -> Self {
        match arg {
            BorderArg::Constant => BorderMode::Constant,
            BorderArg::Clamp => BorderMode::Clamp,
        }
    }
}

pub fn encoder_for(format: ClipFormat) -> anyhow::Result<Box<dyn ClipEncoder>> {
    let encoder: Box<dyn ClipEncoder> = match format {
        ClipFormat::Mp4 => Box::new(FfmpegEncoder::default()),
        ClipFormat::Png => Box::new(PngSequenceEncoder),
    };
    if !encoder.is_available() {
        anyhow::bail!(
            "{} encoder is not available (is ffmpeg on PATH?). Use --format png instead.",
            encoder.name()
        );
    }
    Ok(encoder)
}

/// Directories are read as PNG sequences, anything else through ffmpeg.
pub fn provider_for(path: &Path, max_frames: Option<usize>) -> Box<dyn SourceFrameProvider> {
    if path.is_dir() {
        Box::new(PngSequenceDecoder { max_frames })
    } else {
        Box::new(FfmpegDecoder { max_frames })
    }
}

pub fn kinematics(generation: &GenerationDefaults) -> SuiteKinematics {
    SuiteKinematics {
        pan_speed: generation.pan_speed,
        tilt_speed: generation.tilt_speed,
        zoom_speed: generation.zoom_speed,
        zoom_max: generation.zoom_max,
        dolly_speed: generation.dolly_speed,
        dolly_max: generation.dolly_max,
    }
}
