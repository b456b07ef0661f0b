use anyhow::{anyhow, Result};
use image::RgbImage;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};

/// One word recognized on the strip, with its bounding box and confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    /// Corner order: top-left, top-right, bottom-right, bottom-left
    pub corners: [[f32; 2]; 4],
    /// Normalized to 0.0-1.0
    pub confidence: f32,
}

/// Text recognition over a rectified strip, backed by the external
/// Tesseract executable.
#[derive(Default)]
pub struct TextRecognizer;

impl TextRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Runs Tesseract on the strip and returns word-level results in the
    /// recognizer's native output order.
    pub fn recognize(&self, img: &RgbImage) -> Result<Vec<TextBox>> {
        let tesseract_exe = find_tesseract_executable()?;

        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        // Create temporary output file (Tesseract adds .tsv extension)
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        // Run Tesseract with TSV output for structured data
        let mut command = Command::new(&tesseract_exe);
        command
            .arg(temp_input.path())
            .arg(&output_base)
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("6") // Assume single uniform block of text
            .arg("tsv"); // Output TSV format
        if let Some(tessdata_dir) = find_tessdata_dir() {
            command.arg("--tessdata-dir").arg(tessdata_dir);
        }
        let output = command.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        // Read TSV output
        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;

        // Clean up output file
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

/// Parses Tesseract TSV output into word-level text boxes.
fn parse_tsv_output(tsv: &str) -> Vec<TextBox> {
    let mut boxes = Vec::new();

    for line in tsv.lines().skip(1) {
        // Skip header
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let level: i32 = fields[0].parse().unwrap_or(-1);

        // Level 5 = word
        if level != 5 {
            continue;
        }

        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        if conf < 0.0 {
            continue;
        }

        let (Ok(left), Ok(top), Ok(width), Ok(height)) = (
            fields[6].parse::<f32>(),
            fields[7].parse::<f32>(),
            fields[8].parse::<f32>(),
            fields[9].parse::<f32>(),
        ) else {
            continue;
        };

        boxes.push(TextBox {
            text: text.to_string(),
            corners: [
                [left, top],
                [left + width, top],
                [left + width, top + height],
                [left, top + height],
            ],
            // Tesseract reports 0-100
            confidence: conf / 100.0,
        });
    }

    boxes
}
