//! Still-frame acquisition.
//!
//! Wraps the external still-capture command. Each cycle overwrites the same
//! snapshot file and reads it straight back; the decoded frame is owned by
//! the cycle that captured it.

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// How often to poll the capture process while waiting for it to finish.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct StillCamera {
    command: Vec<String>,
    snapshot_path: PathBuf,
    timeout: Duration,
}

impl StillCamera {
    pub fn new(command: Vec<String>, snapshot_path: PathBuf, timeout: Duration) -> Self {
        Self {
            command,
            snapshot_path,
            timeout,
        }
    }

    /// Captures a fresh still and decodes it.
    ///
    /// Any failure here (spawn, timeout, non-zero exit, missing or unreadable
    /// snapshot) aborts the current cycle; the caller recovers and the next
    /// detection starts over.
    pub fn acquire(&self) -> Result<RgbImage> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("Capture command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .arg("-o")
            .arg(&self.snapshot_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn capture command: {}", program))?;

        // Bounded wait so the driver loop always regains control
        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait().context("Failed to poll capture command")? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "Still capture timed out after {}ms",
                        self.timeout.as_millis()
                    ));
                }
                None => std::thread::sleep(WAIT_POLL_INTERVAL),
            }
        };

        if !status.success() {
            return Err(anyhow!("Capture command exited with {}", status));
        }

        let frame = image::open(&self.snapshot_path)
            .with_context(|| format!("Failed to read snapshot: {}", self.snapshot_path.display()))?;

        Ok(frame.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn sh(script: String) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script]
    }

    #[test]
    fn test_acquire_reads_snapshot() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.png");
        let snapshot = dir.path().join("snapshot.png");

        let mut img = RgbImage::new(4, 4);
        img.put_pixel(1, 2, Rgb([10, 20, 30]));
        img.save(&source).unwrap();

        // acquire() appends "-o <path>", so "-o" lands in $0 and the path in $1
        let camera = StillCamera::new(
            sh(format!("cp {} \"$1\"", source.display())),
            snapshot,
            Duration::from_secs(5),
        );

        let frame = camera.acquire().unwrap();
        assert_eq!(frame.dimensions(), (4, 4));
        assert_eq!(frame.get_pixel(1, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_acquire_missing_snapshot_fails() {
        let dir = tempdir().unwrap();
        let camera = StillCamera::new(
            sh("exit 0".to_string()),
            dir.path().join("never_written.png"),
            Duration::from_secs(5),
        );
        assert!(camera.acquire().is_err());
    }

    #[test]
    fn test_acquire_nonzero_exit_fails() {
        let dir = tempdir().unwrap();
        let camera = StillCamera::new(
            sh("exit 1".to_string()),
            dir.path().join("snapshot.png"),
            Duration::from_secs(5),
        );
        assert!(camera.acquire().is_err());
    }

    #[test]
    fn test_acquire_times_out() {
        let dir = tempdir().unwrap();
        let camera = StillCamera::new(
            sh("sleep 10".to_string()),
            dir.path().join("snapshot.png"),
            Duration::from_millis(100),
        );
        let err = camera.acquire().unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_acquire_undecodable_snapshot_fails() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.png");
        std::fs::write(&snapshot, b"not an image").unwrap();

        let camera = StillCamera::new(sh("exit 0".to_string()), snapshot, Duration::from_secs(5));
        assert!(camera.acquire().is_err());
    }

    #[test]
    fn test_empty_command_fails() {
        let dir = tempdir().unwrap();
        let camera = StillCamera::new(
            vec![],
            dir.path().join("snapshot.png"),
            Duration::from_secs(1),
        );
        assert!(camera.acquire().is_err());
    }
}
