//! Evidence Capture Coordinator
//!
//! Assembles the evidence bundle for a positive decision. Missing evidence
//! never suppresses an alert: a failed capture is recorded and skipped.

use std::path::PathBuf;

use super::types::EvidenceBundle;
use super::webcam::FrameCapture;
use crate::constants::MAX_EVIDENCE_SCREENSHOTS;

pub const MISSING_WEBCAM: &str = "webcam";

pub struct EvidenceCoordinator {
    max_screenshots: usize,
}

impl EvidenceCoordinator {
    pub fn new(max_screenshots: usize) -> Self {
        Self {
            max_screenshots: max_screenshots.min(MAX_EVIDENCE_SCREENSHOTS),
        }
    }

    /// Take the last `max_screenshots` refs and exactly one webcam frame.
    pub fn collect<F>(&self, recent_screenshot_refs: &[PathBuf], webcam_capture: F) -> EvidenceBundle
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        let skip = recent_screenshot_refs.len().saturating_sub(self.max_screenshots);
        let screenshot_refs: Vec<PathBuf> = recent_screenshot_refs[skip..].to_vec();

        let mut bundle = EvidenceBundle {
            screenshot_refs,
            ..Default::default()
        };

        log::info!("Capturing webcam image...");
        match webcam_capture() {
            Some(path) => bundle.webcam_ref = Some(path),
            None => {
                log::warn!("Webcam capture unavailable - alert proceeds without it");
                bundle.missing.push(MISSING_WEBCAM.to_string());
            }
        }

        bundle
    }

    /// Same as `collect`, driving a `FrameCapture` collaborator.
    pub fn collect_with(
        &self,
        recent_screenshot_refs: &[PathBuf],
        camera: &mut dyn FrameCapture,
    ) -> EvidenceBundle {
        self.collect(recent_screenshot_refs, || camera.capture())
    }
}

impl Default for EvidenceCoordinator {
    fn default() -> Self {
        Self::new(MAX_EVIDENCE_SCREENSHOTS)
    }
}
