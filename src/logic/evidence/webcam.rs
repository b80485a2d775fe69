//! Single-frame webcam capture via an external command
//!
//! The core never talks to camera hardware. A configured shell command
//! (e.g. `fswebcam -r 640x480 --no-banner {output}`) writes one frame to
//! `{output}`; any failure yields `None`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;

/// Frames kept in the capture directory
const MAX_CAPTURES: usize = 50;

const OUTPUT_PLACEHOLDER: &str = "{output}";

/// On-demand single-frame capture collaborator.
pub trait FrameCapture: Send {
    fn capture(&mut self) -> Option<PathBuf>;
}

impl<F> FrameCapture for F
where
    F: FnMut() -> Option<PathBuf> + Send,
{
    fn capture(&mut self) -> Option<PathBuf> {
        self()
    }
}

/// Always returns `None`; used when no camera is configured.
pub struct NoCamera;

impl FrameCapture for NoCamera {
    fn capture(&mut self) -> Option<PathBuf> {
        log::debug!("No webcam configured");
        None
    }
}

pub struct CommandCapture {
    command: String,
    save_dir: PathBuf,
    max_captures: usize,
}

impl CommandCapture {
    pub fn new(command: impl Into<String>, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            save_dir: save_dir.into(),
            max_captures: MAX_CAPTURES,
        }
    }

    fn run(&self, output: &Path) -> Result<(), String> {
        let rendered = self
            .command
            .replace(OUTPUT_PLACEHOLDER, &output.to_string_lossy());

        let result = if cfg!(windows) {
            Command::new("cmd").args(["/C", &rendered]).output()
        } else {
            Command::new("sh").args(["-c", &rendered]).output()
        };

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(format!(
                "exit {}: {}",
                out.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&out.stderr).trim()
            )),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Drop the oldest frames beyond `max_captures`.
    fn cleanup_old_captures(&self) {
        let Ok(entries) = fs::read_dir(&self.save_dir) else {
            return;
        };

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with("webcam_"))
            })
            .collect();

        if frames.len() <= self.max_captures {
            return;
        }

        // Names embed the capture time, so lexical order is chronological
        frames.sort();
        let excess = frames.len() - self.max_captures;
        for old in frames.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&old) {
                log::debug!("Failed to remove old capture {}: {}", old.display(), e);
            }
        }
    }
}

impl FrameCapture for CommandCapture {
    fn capture(&mut self) -> Option<PathBuf> {
        if let Err(e) = fs::create_dir_all(&self.save_dir) {
            log::warn!("Cannot create webcam directory {}: {}", self.save_dir.display(), e);
            return None;
        }

        let file_name = format!("webcam_{}.jpg", Utc::now().format("%Y%m%d_%H%M%S%3f"));
        let output = self.save_dir.join(file_name);

        if let Err(e) = self.run(&output) {
            log::warn!("Webcam capture command failed: {}", e);
            return None;
        }

        if !output.exists() {
            log::warn!("Webcam command produced no frame at {}", output.display());
            return None;
        }

        log::info!("Webcam frame captured: {}", output.display());
        self.cleanup_old_captures();
        Some(output)
    }
}
