//! Reading log and debug image output.
//!
//! Readings are appended to a CSV file opened in append mode for each
//! write, ensuring crash safety: if a later cycle dies, earlier readings
//! are already on disk. The annotated strip of the last successful cycle
//! is overwritten alongside it for operator debugging.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Terminal artifact of one pipeline cycle.
///
/// A present level always comes with the reference numeral it was anchored
/// on; the constructors are the only way to build one, so the pairing
/// cannot be violated.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub timestamp: i64,
    pub level: Option<f64>,
    pub reference_numeral: Option<String>,
}

impl Reading {
    /// A successful reading, stamped with the current wall clock.
    pub fn present(level: f64, reference_numeral: String) -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            level: Some(level),
            reference_numeral: Some(reference_numeral),
        }
    }

    /// A cycle that produced no usable numeral.
    pub fn absent() -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            level: None,
            reference_numeral: None,
        }
    }
}

/// Parses one line of the reading log back into a `Reading`.
pub fn parse_line(line: &str) -> Option<Reading> {
    let mut fields = line.trim_end().splitn(3, ',');
    let timestamp: i64 = fields.next()?.parse().ok()?;
    let level: f64 = fields.next()?.parse().ok()?;
    let reference_numeral = fields.next()?.to_string();
    Some(Reading {
        timestamp,
        level: Some(level),
        reference_numeral: Some(reference_numeral),
    })
}

pub struct ReadingLog {
    csv_path: PathBuf,
    debug_path: PathBuf,
}

impl ReadingLog {
    pub fn new(csv_path: PathBuf, debug_path: PathBuf) -> Self {
        Self {
            csv_path,
            debug_path,
        }
    }

    /// Appends one reading as `<unix_ts>,<level>,<reference_numeral>`.
    ///
    /// Readings without a level write nothing; the operator simply sees no
    /// success line for that cycle.
    pub fn append(&self, reading: &Reading) -> Result<()> {
        let (Some(level), Some(reference_numeral)) = (reading.level, &reading.reference_numeral)
        else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .context("Failed to open reading log for append")?;

        writeln!(
            file,
            "{},{:.2},{}",
            reading.timestamp, level, reference_numeral
        )
        .context("Failed to write reading log row")?;

        Ok(())
    }

    /// Saves the rectified strip with a horizontal line drawn at the water
    /// row, overwriting the previous debug image.
    pub fn save_debug(&self, strip: &RgbImage, water_row: u32) -> Result<()> {
        let (width, height) = strip.dimensions();
        if water_row >= height {
            return Err(anyhow!(
                "Water row {} outside strip of height {}",
                water_row,
                height
            ));
        }

        let mut annotated = strip.clone();
        let y = water_row as f32;
        // Two rows thick so the line stays visible on the scaled-down strip;
        // the second segment is clipped away when the row is the last one
        draw_line_segment_mut(&mut annotated, (0.0, y), (width as f32, y), Rgb([0, 255, 0]));
        draw_line_segment_mut(
            &mut annotated,
            (0.0, y + 1.0),
            (width as f32, y + 1.0),
            Rgb([0, 255, 0]),
        );

        annotated
            .save(&self.debug_path)
            .with_context(|| format!("Failed to save debug image: {}", self.debug_path.display()))?;

        Ok(())
    }
}
