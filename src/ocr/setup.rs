use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::process::Command;

/// Finds the Tesseract executable, checking PATH first, then common
/// install locations.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    // Check common paths
    let common_paths = [
        "/usr/bin/tesseract",
        "/usr/local/bin/tesseract",
        "/opt/homebrew/bin/tesseract",
    ];

    for path in &common_paths {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Please install tesseract-ocr and the eng language data."
    ))
}

/// Finds an explicitly configured tessdata directory via TESSDATA_PREFIX.
///
/// Returns `None` when the system default location should be used.
pub fn find_tessdata_dir() -> Option<PathBuf> {
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join("eng.traineddata").exists() {
            return Some(p);
        }
        let p = PathBuf::from(&prefix).join("tessdata");
        if p.join("eng.traineddata").exists() {
            return Some(p);
        }
    }
    None
}
