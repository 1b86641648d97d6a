//! Render the synthetic source scene.

use std::path::PathBuf;

use motionprobe_media::synthetic::{frames_for_duration, synthetic_source};

use super::{encoder_for, ClipFormat};

pub fn run(
    output: PathBuf,
    width: u32,
    height: u32,
    duration: f64,
    fps: f64,
    format: ClipFormat,
) -> anyhow::Result<()> {
    if width < 2 || height < 2 {
        anyhow::bail!("Frame size must be at least 2x2, got {width}x{height}");
    }
    if !(fps.is_finite() && fps > 0.0) || !(duration.is_finite() && duration > 0.0) {
        anyhow::bail!("Duration and fps must be positive");
    }

    let encoder = encoder_for(format)?;
    let frame_count = frames_for_duration(duration, fps);
    println!("Rendering synthetic scene: {width}x{height}, {frame_count} frames @ {fps}fps");

    let frames = synthetic_source(width, height, frame_count)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    encoder
        .encode(&frames, fps, &output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;

    println!("Source written: {}", output.display());
    Ok(())
}
