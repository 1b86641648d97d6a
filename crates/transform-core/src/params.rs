//! Per-frame transform parameters.
//!
//! Kinematics per class:
//!
//! - **PAN/TILT:** a translation of the view window growing linearly with
//!   `t * speed / fps` pixels. Pan right moves the window right, so scene
//!   content drifts left; tilt up moves the window up.
//! - **ZOOM:** one uniform scale about the frame centre, interpolated from
//!   1.0 to `max_zoom` (IN) or its reciprocal (OUT).
//! - **DOLLY:** two scales in the same frame. A centred foreground layer is
//!   magnified more than the background, which is what separates a dolly
//!   from a zoom.
//! - **STATIC:** identity.

use motionprobe_model::{Direction, MotionClass, MotionSpec};

/// Depth layering used to render dolly parallax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxConfig {
    /// Fraction of the foreground zoom applied to the background (0..1).
    pub background_share: f64,

    /// Constant extra magnification of the foreground layer (> 1).
    /// Keeps the two layers distinct on the very first frame.
    pub foreground_bias: f64,

    /// Semi-axes of the foreground ellipse, as a fraction of width and height.
    pub foreground_radius: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            background_share: 0.4,
            foreground_bias: 1.05,
            foreground_radius: 0.3,
        }
    }
}

/// The geometric transform applied to one output frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformParams {
    Identity,
    /// View window offset in pixels; output `(x, y)` samples source `(x + dx, y + dy)`.
    Translate { dx: f64, dy: f64 },
    /// Uniform magnification about the frame centre.
    Scale { factor: f64 },
    /// Depth-dependent magnification: foreground layer and background layer.
    Parallax { background: f64, foreground: f64 },
}

impl TransformParams {
    /// Distinct scale factors applied within the frame.
    pub fn scale_factors(&self) -> Vec<f64> {
        match *self {
            TransformParams::Identity | TransformParams::Translate { .. } => vec![1.0],
            TransformParams::Scale { factor } => vec![factor],
            TransformParams::Parallax {
                background,
                foreground,
            } => vec![background, foreground],
        }
    }

    /// Size of the motion relative to the identity.
    ///
    /// Pixels of displacement for translations, `|ln scale|` for scales
    /// (so a zoom-out of 1/s has the same magnitude as a zoom-in of s).
    pub fn magnitude(&self) -> f64 {
        match *self {
            TransformParams::Identity => 0.0,
            TransformParams::Translate { dx, dy } => dx.hypot(dy),
            TransformParams::Scale { factor } => factor.ln().abs(),
            TransformParams::Parallax {
                background,
                foreground,
            } => background.ln().abs().max(foreground.ln().abs()),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, TransformParams::Identity)
    }
}

/// Fraction of the zoom reached at frame `t` of `total`.
///
/// Linear in `t`, reaching 1.0 on the last frame at speed 1.0 and saturating
/// there at higher speeds. A single-frame clip stays at 0.
pub fn progress(speed: f64, t: usize, total: usize) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    (speed * t as f64 / (total - 1) as f64).clamp(0.0, 1.0)
}

/// Compute the transform for frame `t` of a `total`-frame clip.
///
/// `spec` is assumed valid.
pub fn params_at(
    spec: &MotionSpec,
    t: usize,
    total: usize,
    fps: f64,
    parallax: &ParallaxConfig,
) -> TransformParams {
    match spec.class {
        MotionClass::Static => TransformParams::Identity,
        MotionClass::Pan => {
            let offset = t as f64 * spec.speed / fps;
            let dx = match spec.direction {
                Direction::Left => -offset,
                _ => offset,
            };
            TransformParams::Translate { dx, dy: 0.0 }
        }
        MotionClass::Tilt => {
            let offset = t as f64 * spec.speed / fps;
            let dy = match spec.direction {
                Direction::Up => -offset,
                _ => offset,
            };
            TransformParams::Translate { dx: 0.0, dy }
        }
        MotionClass::Zoom => {
            let p = progress(spec.speed, t, total);
            let scale = 1.0 + (spec.max_zoom - 1.0) * p;
            TransformParams::Scale {
                factor: oriented(scale, spec.direction),
            }
        }
        MotionClass::Dolly => {
            let p = progress(spec.speed, t, total);
            let background = 1.0 + (spec.max_zoom - 1.0) * p * parallax.background_share;
            let foreground = (1.0 + (spec.max_zoom - 1.0) * p) * parallax.foreground_bias;
            TransformParams::Parallax {
                background: oriented(background, spec.direction),
                foreground: oriented(foreground, spec.direction),
            }
        }
    }
}

fn oriented(scale: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Out => 1.0 / scale,
        _ => scale,
    }
}
