//! Prompt templates.
//!
//! The structured presets ask for `MOTION_TYPE`, `DIRECTION`, `CONFIDENCE`
//! and `REASONING` lines, which is the shape the response parser reads.
//! `{frame_count}` is replaced with the number of submitted frames.

use motionprobe_common::PromptConfig;

use crate::error::{InferenceError, InferenceResult};

const GENERAL: &str = "\
You are shown {frame_count} frames sampled in order from one video clip. \
Work out how the camera moved between the first and the last frame.

Possible motions:
- pan: the camera turns left or right from a fixed position
- tilt: the camera turns up or down from a fixed position
- zoom: the lens magnification changes; everything scales uniformly
- dolly: the camera moves toward or away from the scene; near objects grow faster than far ones
- static: the camera does not move

Reply using exactly these lines:
MOTION_TYPE: <pan|tilt|zoom|dolly|static>
DIRECTION: <left|right|up|down|in|out|none>
CONFIDENCE: <a number from 0 to 1>
REASONING: <one or two sentences>";

const DETAILED: &str = "\
You are a cinematographer reviewing {frame_count} frames taken in order from a single shot. \
Classify the camera movement.

Look closely at:
- whether the whole image shifts sideways (pan) or vertically (tilt)
- whether everything grows or shrinks by the same factor (zoom)
- whether foreground objects grow or shrink faster than the background, revealing parallax (dolly)
- whether nothing changes apart from small details (static)

Reply using exactly these lines:
MOTION_TYPE: <pan|tilt|zoom|dolly|static>
DIRECTION: <left|right|up|down|in|out|none>
CONFIDENCE: <a number from 0 to 1, or low/medium/high>
REASONING: <the visual evidence you used>";

const BINARY: &str = "\
Here are {frame_count} frames from a video. Is the camera moving? \
If it is, say how in a short sentence.";

/// A prompt source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTemplate {
    General,
    Detailed,
    /// Free-form yes/no question; replies rarely carry the structured fields.
    Binary,
    Custom(String),
}

impl PromptTemplate {
    pub fn preset(name: &str) -> InferenceResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(PromptTemplate::General),
            "detailed" => Ok(PromptTemplate::Detailed),
            "binary" => Ok(PromptTemplate::Binary),
            other => Err(InferenceError::Config(format!(
                "unknown prompt preset '{other}' (expected general, detailed or binary)"
            ))),
        }
    }

    /// Custom text wins over the preset name.
    pub fn from_config(config: &PromptConfig) -> InferenceResult<Self> {
        match &config.custom {
            Some(text) if !text.trim().is_empty() => Ok(PromptTemplate::Custom(text.clone())),
            _ => Self::preset(&config.preset),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            PromptTemplate::General => GENERAL,
            PromptTemplate::Detailed => DETAILED,
            PromptTemplate::Binary => BINARY,
            PromptTemplate::Custom(text) => text,
        }
    }

    pub fn render(&self, frame_count: usize) -> String {
        self.text().replace("{frame_count}", &frame_count.to_string())
    }
}
