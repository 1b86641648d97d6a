//! Synthetic depth-layered source scene.
//!
//! Stands in for real footage when no source video is given. The layout is
//! authored on a 1280x720 canvas and scaled to the requested size.

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use motionprobe_common::{ProbeError, ProbeResult};
use motionprobe_model::Frame;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_DURATION_SECS: f64 = 3.0;

const REF_WIDTH: f64 = 1280.0;
const REF_HEIGHT: f64 = 720.0;

/// Bits in the frame-index marker bar.
const MARKER_BITS: u32 = 16;

struct Canvas {
    sx: f64,
    sy: f64,
}

impl Canvas {
    fn x(&self, v: i32) -> i32 {
        (v as f64 * self.sx).round() as i32
    }

    fn y(&self, v: i32) -> i32 {
        (v as f64 * self.sy).round() as i32
    }

    /// Rectangle between two reference-space corners, never empty.
    fn rect(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Rect {
        let (left, top) = (self.x(x0), self.y(y0));
        let width = (self.x(x1) - left).max(1) as u32;
        let height = (self.y(y1) - top).max(1) as u32;
        Rect::at(left, top).of_size(width, height)
    }
}

/// Draw frame `frame_index` of the test scene.
pub fn render_scene(width: u32, height: u32, frame_index: usize) -> ProbeResult<Frame> {
    if width == 0 || height == 0 {
        return Err(ProbeError::config(format!(
            "Synthetic scene size must be non-zero, got {width}x{height}"
        )));
    }
    let canvas = Canvas {
        sx: width as f64 / REF_WIDTH,
        sy: height as f64 / REF_HEIGHT,
    };

    // Sky-to-ground gradient
    let mut img: RgbImage = ImageBuffer::from_fn(width, height, |_, y| {
        let level = 255.0 * (1.0 - y as f64 / height as f64);
        Rgb([0, (level / 2.0) as u8, level as u8])
    });

    // Buildings at three depths: far, middle, near
    let buildings = [
        ((100, 400, 200, 600), 20, [100, 100, 100]),
        ((400, 300, 550, 600), 30, [120, 120, 120]),
        ((800, 200, 1000, 600), 40, [140, 140, 140]),
    ];
    for ((x0, y0, x1, y1), roof, shade) in buildings {
        draw_filled_rect_mut(&mut img, canvas.rect(x0, y0, x1, y1), Rgb(shade));
        let roof_shade = shade.map(|c| c / 2);
        draw_filled_rect_mut(&mut img, canvas.rect(x0, y0, x1, y0 + roof), Rgb(roof_shade));
    }

    // Foreground tree
    draw_filled_rect_mut(&mut img, canvas.rect(300, 400, 320, 600), Rgb([101, 67, 33]));
    let radius = ((50.0 * canvas.sx.min(canvas.sy)).round() as i32).max(1);
    draw_filled_circle_mut(&mut img, (canvas.x(310), canvas.y(380)), radius, Rgb([34, 139, 34]));

    // Ground plane with reference ticks every 100 px
    draw_filled_rect_mut(&mut img, canvas.rect(0, 600, 1280, 720), Rgb([90, 140, 90]));
    for tick in (0..1280).step_by(100) {
        draw_filled_rect_mut(
            &mut img,
            canvas.rect(tick - 1, 600, tick + 1, 620),
            Rgb([255, 255, 255]),
        );
    }

    draw_marker_bar(&mut img, &canvas, frame_index);
    Frame::try_from(img).map_err(|e| ProbeError::config(e.to_string()))
}

/// Binary frame counter in the top-left corner: lit cells are set bits.
fn draw_marker_bar(img: &mut RgbImage, canvas: &Canvas, frame_index: usize) {
    for bit in 0..MARKER_BITS {
        let x0 = 10 + bit as i32 * 12;
        let lit = (frame_index >> bit) & 1 == 1;
        let colour = if lit { [255, 255, 255] } else { [40, 40, 40] };
        draw_filled_rect_mut(img, canvas.rect(x0, 10, x0 + 10, 20), Rgb(colour));
    }
}

/// A full synthetic source sequence.
pub fn synthetic_source(width: u32, height: u32, frame_count: usize) -> ProbeResult<Vec<Frame>> {
    (0..frame_count)
        .map(|i| render_scene(width, height, i))
        .collect()
}

/// Frame count for a duration at a frame rate, at least one frame.
pub fn frames_for_duration(duration_secs: f64, fps: f64) -> usize {
    ((duration_secs * fps).round() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_requested_size() {
        let frame = render_scene(320, 180, 0).unwrap();
        assert_eq!((frame.width(), frame.height()), (320, 180));
    }

    #[test]
    fn frames_are_distinct_and_deterministic() {
        let a = render_scene(640, 360, 3).unwrap();
        let b = render_scene(640, 360, 4).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, render_scene(640, 360, 3).unwrap());
    }

    #[test]
    fn tiny_canvas_does_not_panic() {
        let frames = synthetic_source(16, 9, 2).unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn zero_size_scene_is_rejected() {
        assert!(matches!(render_scene(0, 9, 0), Err(ProbeError::Config { .. })));
    }

    #[test]
    fn scene_has_ground_and_sky() {
        let frame = render_scene(DEFAULT_WIDTH, DEFAULT_HEIGHT, 0).unwrap();
        assert_eq!(frame.pixel(640, 700), [90, 140, 90]);
        // Sky above the buildings is blue-dominant.
        let sky = frame.pixel(640, 100);
        assert!(sky[2] > sky[0]);
    }

    #[test]
    fn default_duration_is_ninety_frames() {
        assert_eq!(frames_for_duration(DEFAULT_DURATION_SECS, DEFAULT_FPS), 90);
        assert_eq!(frames_for_duration(0.0, 30.0), 1);
    }
}
