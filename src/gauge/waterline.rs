//! Water-line localization on the rectified strip.
//!
//! The water surface shows up as the strongest horizontal edge: luminance,
//! blur, vertical Sobel, then per-row edge energy. The row with maximum
//! energy wins. There is deliberately no confidence score and no rejection
//! path; the locator always answers, possibly wrongly, and ties go to the
//! topmost row.

use image::{GrayImage, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::vertical_sobel;

/// Sigma matching a 7-tap Gaussian kernel (0.3 * ((7 - 1) * 0.5 - 1) + 0.8).
const BLUR_SIGMA: f32 = 1.4;

/// Returns the strip row most likely to be the water surface.
pub fn find_water_line(strip: &RgbImage) -> u32 {
    let gray: GrayImage = image::imageops::grayscale(strip);
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);

    // Signed 16-bit gradient; taking the magnitude before widening would clip
    let gradient = vertical_sobel(&blurred);
    let (width, height) = gradient.dimensions();

    let mut best_row = 0u32;
    let mut best_energy = -1.0f64;
    for y in 0..height {
        let mut energy = 0.0f64;
        for x in 0..width {
            energy += f64::from(gradient.get_pixel(x, y)[0].unsigned_abs());
        }
        // Strict comparison keeps the first row on ties
        if energy > best_energy {
            best_energy = energy;
            best_row = y;
        }
    }

    best_row
}
