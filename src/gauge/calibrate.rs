//! Numeral calibration.
//!
//! Converts the located water row into an absolute level by anchoring on a
//! printed scale numeral recognized on the strip. Selection is first-match
//! in the recognizer's native order; a numeral far from the water line can
//! shadow a closer one further down the result list. That matches the
//! deployed behavior and is kept as-is.

use crate::ocr::TextBox;

/// Picks the reference numeral and computes the calibrated level.
///
/// Qualifying results have digit-only text and confidence strictly above
/// `min_confidence`. Row indices grow downward, so water sitting below the
/// numeral's printed position reduces the reading.
///
/// Returns `None` when nothing qualifies; the level is never fabricated.
pub fn read_level(
    boxes: &[TextBox],
    water_row: u32,
    pixels_per_unit: f64,
    min_confidence: f32,
) -> Option<(f64, String)> {
    for text_box in boxes {
        if text_box.text.is_empty() || !text_box.text.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if text_box.confidence <= min_confidence {
            continue;
        }
        let Ok(value) = text_box.text.parse::<f64>() else {
            continue;
        };

        // Vertical center from the top-left and bottom-right corners
        let center_row = f64::from(text_box.corners[0][1] + text_box.corners[2][1]) / 2.0;
        let diff_units = (f64::from(water_row) - center_row) / pixels_per_unit;
        let level = value - diff_units;

        return Some(((level * 100.0).round() / 100.0, text_box.text.clone()));
    }

    None
}
