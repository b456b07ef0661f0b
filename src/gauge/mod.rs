//! The gauge vision pipeline: perspective rectification, water-line
//! localization, and numeral calibration.

pub mod calibrate;
pub mod rectify;
pub mod waterline;

use anyhow::Result;
use image::RgbImage;

use crate::config::GaugeConfig;
use crate::monitor::parser::Detection;
use crate::ocr::TextRecognizer;

/// Turns a detection plus camera frame into a calibrated level reading.
pub struct GaugeReader {
    strip_width: u32,
    strip_height: u32,
    pixels_per_unit: f64,
    ocr_confidence_threshold: f32,
    recognizer: TextRecognizer,
}

impl GaugeReader {
    pub fn new(config: &GaugeConfig) -> Self {
        Self {
            strip_width: config.strip_width,
            strip_height: config.strip_height,
            pixels_per_unit: config.pixels_per_unit,
            ocr_confidence_threshold: config.ocr_confidence_threshold,
            recognizer: TextRecognizer::new(),
        }
    }

    /// Straightens the detected gauge region into an upright strip.
    pub fn rectify(&self, frame: &RgbImage, detection: &Detection) -> RgbImage {
        rectify::rectify_region(frame, detection, self.strip_width, self.strip_height)
    }

    /// Reads the scale numerals off the strip and converts the water row
    /// into a calibrated level.
    ///
    /// Returns `Ok(None)` when no qualifying numeral is recognized.
    pub fn read_level(&self, strip: &RgbImage, water_row: u32) -> Result<Option<(f64, String)>> {
        let boxes = self.recognizer.recognize(strip)?;
        Ok(calibrate::read_level(
            &boxes,
            water_row,
            self.pixels_per_unit,
            self.ocr_confidence_threshold,
        ))
    }
}
