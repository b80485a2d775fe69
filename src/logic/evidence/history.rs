//! Rolling screenshot history, maintained by the capture side.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::constants::SCREENSHOT_HISTORY_CAP;

/// FIFO of the most recent screenshot references.
#[derive(Debug, Clone)]
pub struct ScreenshotHistory {
    entries: VecDeque<PathBuf>,
    cap: usize,
}

impl ScreenshotHistory {
    pub fn new() -> Self {
        Self::with_cap(SCREENSHOT_HISTORY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Append a reference. Re-pushing the newest entry is a no-op.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.entries.back() == Some(&path) {
            return;
        }
        if self.entries.len() >= self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(path);
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ScreenshotHistory {
    fn default() -> Self {
        Self::new()
    }
}
