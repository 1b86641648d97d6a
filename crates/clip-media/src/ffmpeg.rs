//! ffmpeg-backed decoder and encoder.
//!
//! Frames cross the process boundary as raw `rgb24` on stdin/stdout.

use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use motionprobe_common::{ProbeError, ProbeResult};
use motionprobe_model::{Frame, CHANNELS};

use crate::codec::{ClipEncoder, SourceFrameProvider};

/// Video stream properties reported by ffprobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
}

/// Decodes any ffmpeg-readable video into RGB frames.
#[derive(Debug, Clone, Default)]
pub struct FfmpegDecoder {
    /// Stop after this many frames.
    pub max_frames: Option<usize>,
}

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frames(max_frames: usize) -> Self {
        Self {
            max_frames: Some(max_frames),
        }
    }
}

impl SourceFrameProvider for FfmpegDecoder {
    fn decode(&self, path: &Path) -> ProbeResult<Vec<Frame>> {
        if !path.exists() {
            return Err(ProbeError::unreadable_source(path, "file does not exist"));
        }
        let info = probe_video(path)
            .ok_or_else(|| ProbeError::unreadable_source(path, "ffprobe found no video stream"))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"]);
        if let Some(max) = self.max_frames {
            cmd.args(["-frames:v", &max.to_string()]);
        }
        cmd.arg("-").stdout(Stdio::piped()).stderr(Stdio::piped());

        tracing::debug!(path = %path.display(), ?info, "Decoding source with ffmpeg");
        let output = cmd
            .output()
            .map_err(|e| ProbeError::unreadable_source(path, format!("Failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(ProbeError::unreadable_source(
                path,
                format!(
                    "ffmpeg decode failed (status {}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let frames = split_raw_frames(&output.stdout, info.width, info.height)
            .map_err(|message| ProbeError::unreadable_source(path, message))?;
        if frames.is_empty() {
            return Err(ProbeError::unreadable_source(path, "no frames decoded"));
        }

        tracing::info!(
            path = %path.display(),
            frames = frames.len(),
            width = info.width,
            height = info.height,
            "Decoded source video"
        );
        Ok(frames)
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg") && command_exists("ffprobe")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Encodes frames to H.264 (`yuv420p`) with one output frame per input frame.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset.
    pub preset: String,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            crf: 18,
            preset: "medium".to_string(),
        }
    }
}

impl FfmpegEncoder {
    fn build_args(&self, width: u32, height: u32, fps: f64, path: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-v".into(),
            "error".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgb24".into(),
            "-s".into(),
            format!("{width}x{height}"),
            "-r".into(),
            format!("{fps}"),
            "-i".into(),
            "-".into(),
            // yuv420p needs even dimensions
            "-vf".into(),
            "pad=ceil(iw/2)*2:ceil(ih/2)*2".into(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            self.preset.clone(),
            "-crf".into(),
            self.crf.to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-fps_mode".into(),
            "passthrough".into(),
            path.to_string_lossy().into_owned(),
        ]
    }
}

impl ClipEncoder for FfmpegEncoder {
    fn encode(&self, frames: &[Frame], fps: f64, path: &Path) -> ProbeResult<()> {
        let first = frames
            .first()
            .ok_or_else(|| ProbeError::encode("Refusing to encode an empty clip"))?;
        let (width, height) = (first.width(), first.height());
        if let Some(bad) = frames
            .iter()
            .position(|f| f.width() != width || f.height() != height)
        {
            return Err(ProbeError::encode(format!(
                "Frame {bad} is {}x{}, expected {width}x{height}",
                frames[bad].width(),
                frames[bad].height()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let args = self.build_args(width, height, fps, path);
        tracing::debug!(?args, "Running ffmpeg");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProbeError::encode(format!("Failed to start ffmpeg: {e}")))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProbeError::encode("Failed to capture ffmpeg stderr"))?;

        // Drain stderr so ffmpeg never blocks on a full pipe while we write frames.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let write_result = {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| ProbeError::encode("Failed to open ffmpeg stdin"))?;
            frames
                .iter()
                .try_for_each(|frame| stdin.write_all(frame.pixels()))
        };

        let status = child
            .wait()
            .map_err(|e| ProbeError::encode(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(ProbeError::encode(format!(
                "ffmpeg encode failed (status {status}): {}",
                stderr_output.trim()
            )));
        }
        write_result
            .map_err(|e| ProbeError::encode(format!("Failed to stream frames to ffmpeg: {e}")))?;

        match count_frames(path) {
            Some(found) if found != frames.len() => {
                return Err(ProbeError::FrameCountMismatch {
                    path: path.to_path_buf(),
                    expected: frames.len(),
                    found,
                });
            }
            Some(_) => {}
            None => tracing::warn!(path = %path.display(), "Could not count encoded frames"),
        }

        tracing::debug!(path = %path.display(), frames = frames.len(), "Encoded clip");
        Ok(())
    }

    fn extension(&self) -> &str {
        "mp4"
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Split a raw `rgb24` stream into frames.
fn split_raw_frames(raw: &[u8], width: u32, height: u32) -> Result<Vec<Frame>, String> {
    let frame_len = width as usize * height as usize * CHANNELS;
    if frame_len == 0 {
        return Err("video has zero-sized frames".to_string());
    }
    if raw.len() % frame_len != 0 {
        return Err(format!(
            "decoded {} bytes, not a multiple of the {frame_len}-byte frame size",
            raw.len()
        ));
    }
    raw.chunks_exact(frame_len)
        .map(|chunk| Frame::from_rgb(width, height, chunk.to_vec()).map_err(|e| e.to_string()))
        .collect()
}

pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Width, height and frame rate of the first video stream.
pub fn probe_video(path: &Path) -> Option<VideoInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "csv=p=0:s=x",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    parse_probe_line(raw.lines().next()?)
}

/// Number of video packets in the first stream. With `libx264` every
/// packet is one frame.
pub fn count_frames(path: &Path) -> Option<usize> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=nb_read_packets",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    parse_count_line(&String::from_utf8_lossy(&output.stdout))
}

fn parse_count_line(raw: &str) -> Option<usize> {
    raw.lines().next()?.trim().trim_end_matches(',').parse().ok()
}

/// Parse `WIDTHxHEIGHTxNUM/DEN` as printed by ffprobe.
fn parse_probe_line(line: &str) -> Option<VideoInfo> {
    let mut parts = line.trim().split('x');
    let width = parts.next()?.parse::<u32>().ok()?;
    let height = parts.next()?.parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    let fps = parts.next().and_then(parse_rate);
    Some(VideoInfo { width, height, fps })
}

fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num.parse::<f64>().ok()?, den.parse::<f64>().ok()?),
        None => (rate.parse::<f64>().ok()?, 1.0),
    };
    (den > 0.0 && num > 0.0).then_some(num / den)
}
