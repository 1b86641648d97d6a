//! The motion transform engine.
//!
//! Turns a source frame sequence and a [`MotionSpec`] into a
//! [`LabeledClip`]. Generation reads only immutable source frames, so
//! clips and the frames within a clip are produced in parallel.

use std::collections::HashMap;

use motionprobe_common::GenerationDefaults;
use motionprobe_model::{Frame, LabeledClip, MotionClass, MotionSpec, SpecError};
use rayon::prelude::*;

use crate::params::{params_at, ParallaxConfig, TransformParams};
use crate::warp::{warp_frame, BorderPolicy};

/// Options shared by every clip an engine produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    /// Output frame rate; converts PAN/TILT speeds to per-frame offsets.
    pub fps: f64,

    /// Frames per clip. `None` uses the source length; longer clips loop
    /// the source.
    pub frame_count: Option<usize>,

    pub border: BorderPolicy,

    pub parallax: ParallaxConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            fps: 30.0,
            frame_count: None,
            border: BorderPolicy::default(),
            parallax: ParallaxConfig::default(),
        }
    }
}

impl GenerateOptions {
    pub fn from_config(config: &GenerationDefaults) -> Self {
        Self {
            fps: config.fps,
            frame_count: config.frame_count,
            border: BorderPolicy::from_config(config),
            parallax: ParallaxConfig {
                background_share: config.dolly_background_share,
                foreground_bias: config.dolly_foreground_bias,
                foreground_radius: config.dolly_foreground_radius,
            },
        }
    }

    fn validate(&self) -> Result<(), GenerateError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(GenerateError::InvalidOptions(format!(
                "fps must be > 0, got {}",
                self.fps
            )));
        }
        if self.frame_count == Some(0) {
            return Err(GenerateError::InvalidOptions(
                "frame_count must be >= 1".to_string(),
            ));
        }
        // Dolly needs two distinct layer scales on every frame.
        let parallax = &self.parallax;
        if !(0.0..1.0).contains(&parallax.background_share) {
            return Err(GenerateError::InvalidOptions(format!(
                "background_share must be in [0, 1), got {}",
                parallax.background_share
            )));
        }
        if !(parallax.foreground_bias.is_finite() && parallax.foreground_bias > 1.0) {
            return Err(GenerateError::InvalidOptions(format!(
                "foreground_bias must be > 1, got {}",
                parallax.foreground_bias
            )));
        }
        if !(parallax.foreground_radius > 0.0 && parallax.foreground_radius <= 0.5) {
            return Err(GenerateError::InvalidOptions(format!(
                "foreground_radius must be in (0, 0.5], got {}",
                parallax.foreground_radius
            )));
        }
        Ok(())
    }
}

/// Why one clip could not be generated. Never affects other clips.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),

    #[error("Source has no frames")]
    EmptySource,

    #[error("Invalid generation options: {0}")]
    InvalidOptions(String),
}

/// Produces labeled clips from source frames.
#[derive(Debug, Clone, Default)]
pub struct MotionTransformEngine {
    options: GenerateOptions,
}

impl MotionTransformEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Per-frame transforms for a clip of `total` frames.
    pub fn params_trace(&self, spec: &MotionSpec, total: usize) -> Vec<TransformParams> {
        (0..total)
            .map(|t| params_at(spec, t, total, self.options.fps, &self.options.parallax))
            .collect()
    }

    /// Generate one clip, using the spec label as its id.
    pub fn generate(&self, source: &[Frame], spec: &MotionSpec) -> Result<LabeledClip, GenerateError> {
        self.generate_with_id(source, spec, spec.label())
    }

    /// Generate one clip under an explicit id.
    pub fn generate_with_id(
        &self,
        source: &[Frame],
        spec: &MotionSpec,
        id: impl Into<String>,
    ) -> Result<LabeledClip, GenerateError> {
        spec.validate()?;
        self.options.validate()?;
        if source.is_empty() {
            return Err(GenerateError::EmptySource);
        }

        let id = id.into();
        let total = self.options.frame_count.unwrap_or(source.len());
        tracing::debug!(clip = %id, frames = total, "Generating clip");

        let frames: Vec<Frame> = if spec.class == MotionClass::Static {
            (0..total).map(|t| source[t % source.len()].clone()).collect()
        } else {
            (0..total)
                .into_par_iter()
                .map(|t| {
                    let params = params_at(spec, t, total, self.options.fps, &self.options.parallax);
                    warp_frame(
                        &source[t % source.len()],
                        &params,
                        self.options.border,
                        &self.options.parallax,
                    )
                })
                .collect()
        };

        Ok(LabeledClip::new(id, frames, *spec, self.options.fps))
    }

    /// Generate every spec in parallel.
    ///
    /// Results come back in input order. Duplicate labels are suffixed
    /// `-2`, `-3`, ... A failed spec yields its error in place.
    pub fn generate_batch(
        &self,
        source: &[Frame],
        specs: &[MotionSpec],
    ) -> Vec<Result<LabeledClip, GenerateError>> {
        tracing::info!(clips = specs.len(), "Generating motion clips");
        let ids = unique_ids(specs);

        let results: Vec<_> = specs
            .par_iter()
            .zip(ids.par_iter())
            .map(|(spec, id)| self.generate_with_id(source, spec, id.clone()))
            .collect();

        for (id, result) in ids.iter().zip(&results) {
            if let Err(e) = result {
                tracing::warn!(clip = %id, "Clip generation failed: {e}");
            }
        }
        results
    }
}

/// Clip ids for a batch: spec labels, with repeats suffixed `-2`, `-3`, ...
pub fn unique_ids(specs: &[MotionSpec]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    specs
        .iter()
        .map(|spec| {
            let label = spec.label();
            let count = seen.entry(label.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                label
            } else {
                format!("{label}-{count}")
            }
        })
        .collect()
}
