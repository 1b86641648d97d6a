//! Backward warping with bilinear sampling.
//!
//! Every output pixel is mapped back into the source frame and sampled.
//! Points that land outside the source extent are resolved by the
//! [`BorderPolicy`].

use motionprobe_common::{BorderMode, GenerationDefaults};
use motionprobe_model::Frame;

use crate::params::{ParallaxConfig, TransformParams};

/// How samples outside the source extent are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderPolicy {
    /// A constant colour (black by default).
    Constant([u8; 3]),
    /// Replicate the nearest edge pixel.
    Clamp,
}

impl Default for BorderPolicy {
    fn default() -> Self {
        BorderPolicy::Constant([0, 0, 0])
    }
}

impl BorderPolicy {
    pub fn from_config(config: &GenerationDefaults) -> Self {
        match config.border {
            BorderMode::Constant => BorderPolicy::Constant(config.border_fill),
            BorderMode::Clamp => BorderPolicy::Clamp,
        }
    }
}

/// Apply `params` to `frame`.
///
/// The identity returns a clone that shares the source buffer, so static
/// output is bit-identical to its input.
pub fn warp_frame(
    frame: &Frame,
    params: &TransformParams,
    border: BorderPolicy,
    parallax: &ParallaxConfig,
) -> Frame {
    let width = frame.width();
    let height = frame.height();
    let cx = (width - 1) as f64 / 2.0;
    let cy = (height - 1) as f64 / 2.0;

    let map: Box<dyn Fn(f64, f64) -> (f64, f64)> = match *params {
        TransformParams::Identity => return frame.clone(),
        TransformParams::Translate { dx, dy } => Box::new(move |x, y| (x + dx, y + dy)),
        TransformParams::Scale { factor } => {
            Box::new(move |x, y| (cx + (x - cx) / factor, cy + (y - cy) / factor))
        }
        TransformParams::Parallax {
            background,
            foreground,
        } => {
            let rx = parallax.foreground_radius * width as f64;
            let ry = parallax.foreground_radius * height as f64;
            Box::new(move |x, y| {
                let fx = cx + (x - cx) / foreground;
                let fy = cy + (y - cy) / foreground;
                let ex = (fx - cx) / rx;
                let ey = (fy - cy) / ry;
                if ex * ex + ey * ey <= 1.0 {
                    (fx, fy)
                } else {
                    (cx + (x - cx) / background, cy + (y - cy) / background)
                }
            })
        }
    };

    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = map(x as f64, y as f64);
            pixels.extend_from_slice(&sample(frame, sx, sy, border));
        }
    }

    Frame::from_rgb(width, height, pixels).unwrap_or_else(|_| frame.clone())
}

/// Bilinear sample at a sub-pixel position.
pub fn sample(frame: &Frame, x: f64, y: f64, border: BorderPolicy) -> [u8; 3] {
    let max_x = (frame.width() - 1) as f64;
    let max_y = (frame.height() - 1) as f64;

    let (x, y) = match border {
        BorderPolicy::Clamp => (x.clamp(0.0, max_x), y.clamp(0.0, max_y)),
        BorderPolicy::Constant(fill) => {
            if !(0.0..=max_x).contains(&x) || !(0.0..=max_y).contains(&y) {
                return fill;
            }
            (x, y)
        }
    };

    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;
    let x0 = x0 as u32;
    let y0 = y0 as u32;
    let x1 = (x0 + 1).min(frame.width() - 1);
    let y1 = (y0 + 1).min(frame.height() - 1);

    let p00 = frame.pixel(x0, y0);
    let p10 = frame.pixel(x1, y0);
    let p01 = frame.pixel(x0, y1);
    let p11 = frame.pixel(x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}
