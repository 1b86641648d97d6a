//! MotionProbe Media
//!
//! External media boundaries for the generator:
//!
//! ```text
//! source.mp4 ── FfmpegDecoder ──► frames ──► (transform) ──► ClipAssembler
//!                                                              │
//!                                      FfmpegEncoder / PngSequenceEncoder
//!                                                              │
//!                                              clips/*.mp4 + manifest.json
//! ```

pub mod assembler;
pub mod codec;
pub mod ffmpeg;
pub mod png_sequence;
pub mod synthetic;

pub use assembler::{load_suite, AssembledSuite, ClipAssembler, ClipHandle, LoadedSuite};
pub use codec::{ClipEncoder, SourceFrameProvider};
pub use ffmpeg::{command_exists, count_frames, probe_video, FfmpegDecoder, FfmpegEncoder, VideoInfo};
pub use png_sequence::{PngSequenceDecoder, PngSequenceEncoder};
