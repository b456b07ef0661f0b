//! Detection event parser.
//!
//! Extracts structured detections from the free-form output of the external
//! inference process. One line of the stream looks like:
//!
//! ```text
//! Object: staff_gauge[3] (0.42) @ 100,50 80x400
//! ```
//!
//! Anything else is skipped without comment; parsing failures are never
//! fatal to the stream.

use anyhow::Result;
use regex::Regex;

/// Pattern for a detection line: label token, object id, confidence in
/// parentheses, then pixel position and size.
const DETECTION_PATTERN: &str =
    r"Object:\s+(\w+)\[\d+\]\s+\(([\d.]+)\)\s+@\s+(\d+),(\d+)\s+(\d+)x(\d+)";

/// One detection reported by the external inference process.
///
/// Box coordinates are pixels in the full camera frame, top-left origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Detection {
    /// Returns true if this detection should trigger a capture.
    ///
    /// The label must match the target case-insensitively and the confidence
    /// must strictly exceed the threshold. A confidence exactly equal to the
    /// threshold does not qualify.
    pub fn is_actionable(&self, target_label: &str, threshold: f32) -> bool {
        self.label.eq_ignore_ascii_case(target_label) && self.confidence > threshold
    }
}

/// Stateless per-line parser for the detector output.
pub struct LineParser {
    pattern: Regex,
}

impl LineParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(DETECTION_PATTERN)?,
        })
    }

    /// Parses one line of detector output.
    ///
    /// Returns `None` for lines that do not match the detection shape or
    /// whose numeric fields fail to parse.
    pub fn parse_line(&self, line: &str) -> Option<Detection> {
        let caps = self.pattern.captures(line)?;

        let label = caps.get(1)?.as_str().to_string();
        let confidence: f32 = caps.get(2)?.as_str().parse().ok()?;
        let x: u32 = caps.get(3)?.as_str().parse().ok()?;
        let y: u32 = caps.get(4)?.as_str().parse().ok()?;
        let width: u32 = caps.get(5)?.as_str().parse().ok()?;
        let height: u32 = caps.get(6)?.as_str().parse().ok()?;

        Some(Detection {
            label,
            confidence,
            x,
            y,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LineParser {
        LineParser::new().unwrap()
    }

    #[test]
    fn test_parse_valid_line() {
        let det = parser()
            .parse_line("Object: staff_gauge[3] (0.42) @ 100,50 80x400")
            .unwrap();
        assert_eq!(det.label, "staff_gauge");
        assert_eq!(det.confidence, 0.42);
        assert_eq!(det.x, 100);
        assert_eq!(det.y, 50);
        assert_eq!(det.width, 80);
        assert_eq!(det.height, 400);
    }

    #[test]
    fn test_parse_embedded_in_verbose_output() {
        // The detector wraps detections in other diagnostic text
        let line = "[2:01:13.123] viewfinder Object: staff_gauge[0] (0.91) @ 12,7 64x512 fps 30";
        let det = parser().parse_line(line).unwrap();
        assert_eq!(det.label, "staff_gauge");
        assert_eq!(det.confidence, 0.91);
        assert_eq!(det.width, 64);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        let p = parser();
        assert_eq!(p.parse_line(""), None);
        assert_eq!(p.parse_line("made 12 buffers"), None);
        assert_eq!(p.parse_line("Object: staff_gauge (0.42) @ 100,50 80x400"), None); // no id
        assert_eq!(p.parse_line("Object: staff_gauge[3] 0.42 @ 100,50 80x400"), None); // no parens
        assert_eq!(p.parse_line("Object: staff_gauge[3] (0.42) @ 100,50"), None); // no size
    }

    #[test]
    fn test_actionable_requires_label_and_confidence() {
        let det = parser()
            .parse_line("Object: staff_gauge[1] (0.42) @ 0,0 10x10")
            .unwrap();
        assert!(det.is_actionable("staff_gauge", 0.3));
        assert!(det.is_actionable("STAFF_GAUGE", 0.3)); // case-insensitive
        assert!(!det.is_actionable("pump", 0.3)); // wrong label
        assert!(!det.is_actionable("staff_gauge", 0.5)); // below threshold
    }

    #[test]
    fn test_confidence_equal_to_threshold_not_actionable() {
        let det = parser()
            .parse_line("Object: staff_gauge[1] (0.3) @ 0,0 10x10")
            .unwrap();
        assert!(!det.is_actionable("staff_gauge", 0.3));
    }

    #[test]
    fn test_other_labels_parse_but_are_ignored() {
        let det = parser()
            .parse_line("Object: person[2] (0.88) @ 5,5 20x60")
            .unwrap();
        assert_eq!(det.label, "person");
        assert!(!det.is_actionable("staff_gauge", 0.3));
    }
}
