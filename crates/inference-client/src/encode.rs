//! Frame upload encoding: JPEG, then base64.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use motionprobe_model::Frame;

use crate::error::{InferenceError, InferenceResult};

pub const JPEG_MIME: &str = "image/jpeg";

/// Default JPEG quality for uploaded frames.
pub const JPEG_QUALITY: u8 = 90;

pub fn encode_jpeg(frame: &Frame, quality: u8) -> InferenceResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&frame.to_image())
        .map_err(|e| InferenceError::FrameEncoding(e.to_string()))?;
    Ok(buf.into_inner())
}

/// JPEG-encode every frame and return the base64 payloads in order.
pub fn encode_frames(frames: &[Frame]) -> InferenceResult<Vec<String>> {
    frames
        .iter()
        .map(|frame| encode_jpeg(frame, JPEG_QUALITY).map(|jpeg| STANDARD.encode(jpeg)))
        .collect()
}
