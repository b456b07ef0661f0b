//! Detector process wrapper.
//!
//! Spawns the external inference command and exposes its stderr as a
//! blocking stream of lines. The detector writes detections (and plenty of
//! other diagnostics) to stderr; stdout is discarded.

use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStderr, Command, Stdio};

pub struct DetectorStream {
    child: Child,
    reader: BufReader<ChildStderr>,
}

impl DetectorStream {
    /// Spawns the detector command and attaches to its stderr.
    pub fn spawn(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("Detector command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn detector: {}", program))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("Detector stderr was not captured"))?;

        Ok(Self {
            child,
            reader: BufReader::new(stderr),
        })
    }

    /// Blocks until the next line of detector output, or `None` on EOF.
    pub fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = line.trim_end();
                    if !trimmed.is_empty() {
                        return Some(trimmed.to_string());
                    }
                    // Blank line, keep reading
                }
                Err(_) => return None,
            }
        }
    }
}

impl Drop for DetectorStream {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
