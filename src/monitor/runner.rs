//! Driver loop for the gauge monitor.
//!
//! Consumes the detector stream one line at a time and runs each triggered
//! pipeline cycle synchronously to completion before reading the next line.
//! A cool-down after each trigger bounds the capture rate. No failure inside
//! a cycle ever stops the loop; only stream EOF (or an operator interrupt)
//! ends it.

use anyhow::{Error, Result};
use std::time::{Duration, Instant};

use crate::capture::StillCamera;
use crate::config::get_config;
use crate::gauge::waterline::find_water_line;
use crate::gauge::GaugeReader;
use crate::log;
use crate::monitor::parser::{Detection, LineParser};
use crate::monitor::stream::DetectorStream;
use crate::paths;
use crate::sink::{Reading, ReadingLog};

/// Outcome of one triggered pipeline cycle.
///
/// The driver loop branches on this instead of unwinding through errors:
/// every variant is recoverable and the loop continues either way.
pub enum CycleOutcome {
    /// A calibrated level was computed and logged.
    Logged { level: f64, numeral: String },
    /// The pipeline ran but no qualifying scale numeral was recognized.
    NoNumeral,
    /// Still capture or decode failed; the cycle was aborted early.
    CaptureFailed(Error),
}

/// Runs the monitor until the detector stream ends.
pub fn run() -> Result<()> {
    let config = get_config();
    let parser = LineParser::new()?;
    let camera = StillCamera::new(
        config.capture_command.clone(),
        paths::get_snapshots_dir().join(&config.snapshot_file),
        Duration::from_millis(config.capture_timeout_ms),
    );
    let reader = GaugeReader::new(config);
    let sink = ReadingLog::new(
        paths::get_data_dir().join(&config.csv_file),
        paths::get_snapshots_dir().join(&config.debug_image_file),
    );
    let cooldown = Duration::from_secs(config.cooldown_secs);

    let mut stream = DetectorStream::spawn(&config.detector_command)?;
    log(&format!(
        "--- Starting stream: monitoring for {} ---",
        config.target_label
    ));

    let mut last_cycle_end: Option<Instant> = None;

    while let Some(line) = stream.next_line() {
        let Some(detection) = should_trigger(
            &parser,
            &line,
            &config.target_label,
            config.confidence_threshold,
            last_cycle_end,
            cooldown,
        ) else {
            continue;
        };

        log(&format!(
            "Gauge detected ({:.2}). Calculating level...",
            detection.confidence
        ));

        match run_cycle(&camera, &reader, &sink, &detection) {
            CycleOutcome::Logged { level, numeral } => {
                log(&format!("SUCCESS: Water level at {:.2} (ref: {})", level, numeral));
            }
            CycleOutcome::NoNumeral => {
                log("Gauge found, but could not read numbers.");
            }
            CycleOutcome::CaptureFailed(e) => {
                log(&format!("Capture failed: {:#}", e));
            }
        }

        // The cool-down window is anchored at completion, so the suppressed
        // interval excludes the cycle's own processing time
        last_cycle_end = Some(Instant::now());
    }

    log("Detector stream ended.");
    Ok(())
}

/// Decides whether one detector line should trigger a pipeline cycle.
///
/// Applies the checks in order: the line must parse as a detection, the
/// detection must be actionable, and the cool-down since the end of the
/// previous cycle must have elapsed. Anything else is ignored silently.
fn should_trigger(
    parser: &LineParser,
    line: &str,
    target_label: &str,
    confidence_threshold: f32,
    last_cycle_end: Option<Instant>,
    cooldown: Duration,
) -> Option<Detection> {
    let detection = parser.parse_line(line)?;
    if !detection.is_actionable(target_label, confidence_threshold) {
        return None;
    }
    if last_cycle_end.is_some_and(|t| t.elapsed() < cooldown) {
        return None;
    }
    Some(detection)
}

/// Runs one full pipeline cycle for an actionable detection.
///
/// capture -> rectify -> locate water line -> calibrate -> sink.
/// All per-cycle buffers are dropped when this returns.
fn run_cycle(
    camera: &StillCamera,
    reader: &GaugeReader,
    sink: &ReadingLog,
    detection: &Detection,
) -> CycleOutcome {
    let frame = match camera.acquire() {
        Ok(frame) => frame,
        Err(e) => return CycleOutcome::CaptureFailed(e),
    };

    let strip = reader.rectify(&frame, detection);
    let water_row = find_water_line(&strip);

    let reading = match reader.read_level(&strip, water_row) {
        Ok(Some((level, numeral))) => Reading::present(level, numeral),
        Ok(None) => Reading::absent(),
        Err(e) => {
            log(&format!("OCR failed: {:#}", e));
            Reading::absent()
        }
    };

    // A failed append must not kill the loop; the next cycle tries again
    if let Err(e) = sink.append(&reading) {
        log(&format!("Failed to append reading: {:#}", e));
    }

    match (reading.level, reading.reference_numeral) {
        (Some(level), Some(numeral)) => {
            if let Err(e) = sink.save_debug(&strip, water_row) {
                log(&format!("Failed to save debug image: {:#}", e));
            }
            CycleOutcome::Logged { level, numeral }
        }
        _ => CycleOutcome::NoNumeral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "Object: staff_gauge[3] (0.42) @ 100,50 80x400";

    fn parser() -> LineParser {
        LineParser::new().unwrap()
    }

    fn trigger(line: &str, last_cycle_end: Option<Instant>, cooldown_secs: u64) -> Option<Detection> {
        should_trigger(
            &parser(),
            line,
            "staff_gauge",
            0.3,
            last_cycle_end,
            Duration::from_secs(cooldown_secs),
        )
    }

    #[test]
    fn test_actionable_line_triggers_when_idle() {
        let detection = trigger(LINE, None, 10).unwrap();
        assert_eq!(detection.label, "staff_gauge");
        assert_eq!(detection.width, 80);
    }

    #[test]
    fn test_unparsable_and_unactionable_lines_do_not_trigger() {
        assert!(trigger("made 12 buffers", None, 10).is_none());
        assert!(trigger("Object: person[2] (0.88) @ 5,5 20x60", None, 10).is_none());
        assert!(trigger("Object: staff_gauge[3] (0.30) @ 100,50 80x400", None, 10).is_none());
    }

    #[test]
    fn test_detection_during_cooldown_is_ignored() {
        let just_finished = Some(Instant::now());
        assert!(trigger(LINE, just_finished, 10).is_none());
    }

    #[test]
    fn test_detection_after_cooldown_triggers() {
        let long_ago = Some(Instant::now() - Duration::from_secs(11));
        assert!(trigger(LINE, long_ago, 10).is_some());
    }

    #[test]
    fn test_cooldown_is_measured_from_cycle_completion() {
        // A slow cycle: triggered 11 s ago but finished only 8 s ago. The
        // window runs from completion, so the detection stays suppressed.
        let finished_recently = Some(Instant::now() - Duration::from_secs(8));
        assert!(trigger(LINE, finished_recently, 10).is_none());
    }

    #[test]
    fn test_zero_cooldown_always_triggers() {
        let just_finished = Some(Instant::now());
        assert!(trigger(LINE, just_finished, 0).is_some());
    }
}
