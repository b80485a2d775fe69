//! Summary-file sink: appends a fixed block per alert to one text file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::NotificationSink;
use crate::constants::ALERT_SUMMARY_FILE;
use crate::error::NotifyError;
use crate::logic::alert::Alert;

pub struct SummaryFileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SummaryFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `<dir>/alert_summary.txt`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(ALERT_SUMMARY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn render_summary(alert: &Alert) -> String {
    let rule = "=".repeat(60);
    format!(
        "\n{rule}\nALERT: {}\nTime: {}\nSeverity: {}\nRisk Score: {:.3}\nMachine: {}\nEvidence: {} screenshots\n{rule}\n",
        alert.alert_id,
        alert.created_at.to_rfc3339(),
        alert.severity,
        alert.risk_score,
        alert.machine_info.hostname,
        alert.evidence.screenshot_refs.len(),
    )
}

impl NotificationSink for SummaryFileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let _guard = self.write_lock.lock();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(render_summary(alert).as_bytes())?;
        Ok(())
    }
}
