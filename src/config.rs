//! Configuration for the gauge monitor.
//!
//! Loads settings from config.json at startup. Provides the external
//! detector/capture commands, detection thresholds, and the gauge-specific
//! calibration constants.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<GaugeConfig> = OnceLock::new();

/// Complete monitor configuration.
///
/// All values are fixed at startup; nothing here is runtime-mutable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Detection label that identifies the staff gauge
    #[serde(default = "default_target_label")]
    pub target_label: String,
    /// Minimum detector confidence to trigger a capture (strictly greater-than)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Minimum OCR confidence for a scale numeral (0.0-1.0, strictly greater-than)
    #[serde(default = "default_ocr_confidence_threshold")]
    pub ocr_confidence_threshold: f32,
    /// Width of the rectified gauge strip in pixels
    #[serde(default = "default_strip_width")]
    pub strip_width: u32,
    /// Height of the rectified gauge strip in pixels
    #[serde(default = "default_strip_height")]
    pub strip_height: u32,
    /// Vertical pixels per physical unit on the rectified strip.
    /// Operator-supplied; depends on the gauge and the strip dimensions.
    #[serde(default = "default_pixels_per_unit")]
    pub pixels_per_unit: f64,
    /// Seconds to ignore further detections after a triggered capture
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Maximum time to wait for the still-capture command (milliseconds)
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,
    /// Command producing the detection stream on stderr
    #[serde(default = "default_detector_command")]
    pub detector_command: Vec<String>,
    /// Still-capture command; the snapshot path is appended as `-o <path>`
    #[serde(default = "default_capture_command")]
    pub capture_command: Vec<String>,
    /// Snapshot filename within the snapshots directory (overwritten each cycle)
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
    /// Reading log filename within the data directory
    #[serde(default = "default_csv_file")]
    pub csv_file: String,
    /// Annotated debug image filename within the snapshots directory
    #[serde(default = "default_debug_image_file")]
    pub debug_image_file: String,
}

fn default_target_label() -> String {
    "staff_gauge".to_string()
}

fn default_confidence_threshold() -> f32 {
    0.3
}

fn default_ocr_confidence_threshold() -> f32 {
    0.5
}

fn default_strip_width() -> u32 {
    150
}

fn default_strip_height() -> u32 {
    600
}

fn default_pixels_per_unit() -> f64 {
    5.0
}

fn default_cooldown_secs() -> u64 {
    10
}

fn default_capture_timeout_ms() -> u64 {
    // Typical capture latency is under a second; this bounds the stalls
    5000
}

fn default_detector_command() -> Vec<String> {
    [
        "rpicam-hello",
        "-t",
        "0",
        "--post-process-file",
        "/usr/share/rpi-camera-assets/hailo_yolov6_inference.json",
        "--verbose",
        "2",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_capture_command() -> Vec<String> {
    // -n suppresses the preview window, -t bounds the capture latency
    ["rpicam-still", "-t", "500", "-n"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_snapshot_file() -> String {
    "current_gauge.jpg".to_string()
}

fn default_csv_file() -> String {
    "water_levels.csv".to_string()
}

fn default_debug_image_file() -> String {
    "last_detection_debug.jpg".to_string()
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            target_label: default_target_label(),
            confidence_threshold: default_confidence_threshold(),
            ocr_confidence_threshold: default_ocr_confidence_threshold(),
            strip_width: default_strip_width(),
            strip_height: default_strip_height(),
            pixels_per_unit: default_pixels_per_unit(),
            cooldown_secs: default_cooldown_secs(),
            capture_timeout_ms: default_capture_timeout_ms(),
            detector_command: default_detector_command(),
            capture_command: default_capture_command(),
            snapshot_file: default_snapshot_file(),
            csv_file: default_csv_file(),
            debug_image_file: default_debug_image_file(),
        }
    }
}

/// Loads configuration from config.json or returns defaults.
/// Looks for config.json in the same directory as the executable.
fn load_config() -> GaugeConfig {
    // Try to find config.json next to the executable
    let config_path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| Path::new("config.json").to_path_buf());

    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    GaugeConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static GaugeConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gauge_constants() {
        let config = GaugeConfig::default();
        assert_eq!(config.target_label, "staff_gauge");
        assert_eq!(config.confidence_threshold, 0.3);
        assert_eq!(config.ocr_confidence_threshold, 0.5);
        assert_eq!(config.strip_width, 150);
        assert_eq!(config.strip_height, 600);
        assert_eq!(config.pixels_per_unit, 5.0);
        assert_eq!(config.cooldown_secs, 10);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: GaugeConfig =
            serde_json::from_str(r#"{"target_label": "ruler", "pixels_per_unit": 7.5}"#).unwrap();
        assert_eq!(config.target_label, "ruler");
        assert_eq!(config.pixels_per_unit, 7.5);
        // Unspecified fields fall back to defaults
        assert_eq!(config.confidence_threshold, 0.3);
        assert_eq!(config.strip_height, 600);
    }
}
