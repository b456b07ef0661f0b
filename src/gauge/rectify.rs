//! Perspective rectification of the gauge region.
//!
//! Maps the detection box onto a canonical upright strip. The box is taken
//! as the four corners of the gauge quadrilateral (top-left, top-right,
//! bottom-right, bottom-left). With a heavily oblique camera view this
//! axis-aligned approximation introduces a systematic bias; the planar
//! model here does not correct for it.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::monitor::parser::Detection;

/// Rectifies the detection box into a `target_w` x `target_h` strip.
///
/// Box coordinates are clamped to the frame extent first, so a box hanging
/// off the frame degrades coverage instead of failing. A box entirely
/// outside the frame (degenerate after clamping) yields a black strip.
pub fn rectify_region(
    frame: &RgbImage,
    detection: &Detection,
    target_w: u32,
    target_h: u32,
) -> RgbImage {
    let (frame_w, frame_h) = frame.dimensions();
    let mut out = RgbImage::new(target_w, target_h);

    let x0 = detection.x.min(frame_w) as f32;
    let y0 = detection.y.min(frame_h) as f32;
    let x1 = detection.x.saturating_add(detection.width).min(frame_w) as f32;
    let y1 = detection.y.saturating_add(detection.height).min(frame_h) as f32;

    let source = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)];
    let dest = [
        (0.0, 0.0),
        (target_w as f32, 0.0),
        (target_w as f32, target_h as f32),
        (0.0, target_h as f32),
    ];

    // A zero-area source quad has no projective transform onto the strip
    if let Some(projection) = Projection::from_control_points(source, dest) {
        warp_into(
            frame,
            &projection,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut out,
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x: u32, y: u32, width: u32, height: u32) -> Detection {
        Detection {
            label: "staff_gauge".to_string(),
            confidence: 0.9,
            x,
            y,
            width,
            height,
        }
    }

    fn two_tone_frame() -> RgbImage {
        // Left half red, right half blue
        RgbImage::from_fn(100, 100, |x, _| {
            if x < 50 {
                Rgb([200, 0, 0])
            } else {
                Rgb([0, 0, 200])
            }
        })
    }

    #[test]
    fn test_identity_box_preserves_frame() {
        let frame = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 0]));
        let strip = rectify_region(&frame, &detection(0, 0, 8, 8), 8, 8);
        assert_eq!(strip.dimensions(), (8, 8));
        // Interior pixels only; the resampler's last row/column sit on the
        // sampling boundary
        for y in 0..7 {
            for x in 0..7 {
                assert_eq!(
                    strip.get_pixel(x, y),
                    frame.get_pixel(x, y),
                    "mismatch at ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_sub_region_is_resampled_to_strip() {
        let frame = two_tone_frame();
        // Left (red) half of the frame, stretched to a tall strip
        let strip = rectify_region(&frame, &detection(0, 0, 50, 100), 20, 80);
        assert_eq!(strip.dimensions(), (20, 80));
        assert_eq!(strip.get_pixel(10, 40), &Rgb([200, 0, 0]));
    }

    #[test]
    fn test_out_of_bounds_box_is_clamped() {
        let frame = two_tone_frame();
        // Box extends far past the right and bottom edges
        let strip = rectify_region(&frame, &detection(60, 60, 500, 500), 20, 80);
        assert_eq!(strip.dimensions(), (20, 80));
        // Clamped region lies in the blue half
        assert_eq!(strip.get_pixel(10, 40), &Rgb([0, 0, 200]));
    }

    #[test]
    fn test_fully_outside_box_yields_black_strip() {
        let frame = two_tone_frame();
        let strip = rectify_region(&frame, &detection(500, 500, 50, 50), 20, 80);
        assert_eq!(strip.dimensions(), (20, 80));
        for pixel in strip.pixels() {
            assert_eq!(pixel, &Rgb([0, 0, 0]));
        }
    }

    #[test]
    fn test_strip_size_is_fixed_regardless_of_box() {
        let frame = two_tone_frame();
        let strip = rectify_region(&frame, &detection(10, 5, 30, 90), 150, 600);
        assert_eq!(strip.dimensions(), (150, 600));
    }
}
