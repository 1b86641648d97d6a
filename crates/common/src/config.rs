//! Harness configuration.
//!
//! The core consumes these values but does not own them: motion speeds and
//! zoom limits feed clip generation, the sample count feeds the frame
//! sampler, and the inference section selects a backend and its bounds.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ProbeError, ProbeResult};

/// Global harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory where generated clips and reports are written.
    pub output_dir: PathBuf,

    /// Clip generation defaults.
    pub generation: GenerationDefaults,

    /// Frame sampling settings.
    pub sampling: SamplingDefaults,

    /// Inference backend selection and limits.
    pub inference: InferenceConfig,

    /// Prompt sent alongside the sampled frames.
    pub prompt: PromptConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default parameters for the canonical motion suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationDefaults {
    /// Output frame rate of generated clips.
    pub fps: f64,

    /// Pan speed in pixels per second.
    pub pan_speed: f64,

    /// Tilt speed in pixels per second.
    pub tilt_speed: f64,

    /// Zoom progress rate (1.0 reaches `zoom_max` on the last frame).
    pub zoom_speed: f64,

    /// Terminal magnification for zoom clips.
    pub zoom_max: f64,

    /// Dolly progress rate (1.0 reaches `dolly_max` on the last frame).
    pub dolly_speed: f64,

    /// Terminal magnification of the dolly foreground layer.
    pub dolly_max: f64,

    /// Share of the dolly zoom applied to the background layer (0..1).
    pub dolly_background_share: f64,

    /// Extra magnification of the dolly foreground layer over the background.
    pub dolly_foreground_bias: f64,

    /// Semi-axes of the foreground ellipse as a fraction of frame size.
    pub dolly_foreground_radius: f64,

    /// Frames per generated clip; `None` uses the source length.
    pub frame_count: Option<usize>,

    /// How pixels warped in from outside the source extent are filled.
    pub border: BorderMode,

    /// Fill colour used by [`BorderMode::Constant`].
    pub border_fill: [u8; 3],
}

/// Border policy for pixels that map outside the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Fill with a constant colour.
    #[default]
    Constant,
    /// Replicate the nearest edge pixel.
    Clamp,
}

/// Frame sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingDefaults {
    /// Number of frames submitted per clip (N >= 2).
    pub frame_count: usize,
}

/// Inference backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Backend variant: "gemini", "openai", "anthropic" or "scripted".
    pub backend: String,

    /// Model identifier passed to the backend.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Override for the backend base URL.
    pub base_url: Option<String>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Retries after the first attempt for recoverable failures.
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Upper bound on any single retry wait, including a server-supplied
    /// Retry-After, in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Maximum number of in-flight inference calls (>= 1).
    pub concurrency: usize,

    /// Canned responses replayed by the "scripted" backend.
    pub scripted_responses: Vec<String>,
}

/// Prompt selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Built-in template: "general", "detailed" or "binary".
    pub preset: String,

    /// Custom template text; takes precedence over `preset` when set.
    pub custom: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "motionprobe_eval=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("camera_motions"),
            generation: GenerationDefaults::default(),
            sampling: SamplingDefaults::default(),
            inference: InferenceConfig::default(),
            prompt: PromptConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            fps: 30.0,
            pan_speed: 50.0,
            tilt_speed: 30.0,
            zoom_speed: 1.0,
            zoom_max: 1.5,
            dolly_speed: 1.0,
            dolly_max: 1.5,
            dolly_background_share: 0.4,
            dolly_foreground_bias: 1.05,
            dolly_foreground_radius: 0.3,
            frame_count: None,
            border: BorderMode::Constant,
            border_fill: [0, 0, 0],
        }
    }
}

impl Default for SamplingDefaults {
    fn default() -> Self {
        Self { frame_count: 8 }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: None,
            timeout_secs: 120,
            max_retries: 2,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 30_000,
            concurrency: 4,
            scripted_responses: vec![],
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            preset: "detailed".to_string(),
            custom: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl HarnessConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`HarnessConfig::load`],
    /// a missing or malformed file is an error.
    pub fn load_from(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProbeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ProbeResult<()> {
        self.save_to(config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ProbeResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check the ranges the core relies on.
    pub fn validate(&self) -> ProbeResult<()> {
        let g = &self.generation;
        if !(g.fps.is_finite() && g.fps > 0.0) {
            return Err(ProbeError::config(format!("fps must be > 0, got {}", g.fps)));
        }
        for (name, speed) in [
            ("pan_speed", g.pan_speed),
            ("tilt_speed", g.tilt_speed),
            ("zoom_speed", g.zoom_speed),
            ("dolly_speed", g.dolly_speed),
        ] {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(ProbeError::config(format!(
                    "{name} must be > 0, got {speed}"
                )));
            }
        }
        for (name, max_zoom) in [("zoom_max", g.zoom_max), ("dolly_max", g.dolly_max)] {
            if !(max_zoom.is_finite() && max_zoom >= 1.0) {
                return Err(ProbeError::config(format!(
                    "{name} must be >= 1, got {max_zoom}"
                )));
            }
        }
        if !(0.0..1.0).contains(&g.dolly_background_share) {
            return Err(ProbeError::config(format!(
                "dolly_background_share must be in [0, 1), got {}",
                g.dolly_background_share
            )));
        }
        if !(g.dolly_foreground_bias.is_finite() && g.dolly_foreground_bias > 1.0) {
            return Err(ProbeError::config(format!(
                "dolly_foreground_bias must be > 1, got {}",
                g.dolly_foreground_bias
            )));
        }
        if !(g.dolly_foreground_radius > 0.0 && g.dolly_foreground_radius <= 0.5) {
            return Err(ProbeError::config(format!(
                "dolly_foreground_radius must be in (0, 0.5], got {}",
                g.dolly_foreground_radius
            )));
        }
        if g.frame_count == Some(0) {
            return Err(ProbeError::config("generation.frame_count must be >= 1"));
        }
        if self.sampling.frame_count < 2 {
            return Err(ProbeError::config(format!(
                "sampling.frame_count must be >= 2, got {}",
                self.sampling.frame_count
            )));
        }
        if self.inference.concurrency < 1 {
            return Err(ProbeError::config("inference.concurrency must be >= 1"));
        }
        if self.inference.timeout_secs == 0 {
            return Err(ProbeError::config("inference.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("motionprobe").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = HarnessConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sampling.frame_count, 8);
        assert_eq!(config.generation.border, BorderMode::Constant);
    }

    #[test]
    fn rejects_single_frame_sampling() {
        let mut config = HarnessConfig::default();
        config.sampling.frame_count = 1;
        assert!(matches!(config.validate(), Err(ProbeError::Config { .. })));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut config = HarnessConfig::default();
        config.inference.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_shrinking_max_zoom() {
        let mut config = HarnessConfig::default();
        config.generation.zoom_max = 0.8;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("zoom_max"));
    }

    #[test]
    fn rejects_flat_dolly_bias() {
        let mut config = HarnessConfig::default();
        config.generation.dolly_foreground_bias = 1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dolly_foreground_bias"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let parsed: HarnessConfig =
            serde_json::from_str(r#"{"sampling": {"frame_count": 12}}"#).unwrap();
        assert_eq!(parsed.sampling.frame_count, 12);
        assert_eq!(parsed.inference.concurrency, 4);
        assert!((parsed.generation.pan_speed - 50.0).abs() < 1e-9);
    }

    #[test]
    fn save_and_load_roundtrip_on_disk() {
        let dir = std::env::temp_dir().join("motionprobe_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = HarnessConfig::default();
        config.inference.backend = "scripted".to_string();
        config.save_to(&path).unwrap();

        let loaded = HarnessConfig::load_from(&path).unwrap();
        assert_eq!(loaded.inference.backend, "scripted");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_from_missing_path_is_error() {
        let err = HarnessConfig::load_from("/nonexistent/motionprobe.json").unwrap_err();
        assert!(matches!(err, ProbeError::FileNotFound { .. }));
    }
}
