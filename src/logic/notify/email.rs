//! Email sink
//!
//! Renders an RFC 5322 message and drops it into a pickup directory
//! (`<outbox>/<alert_id>.eml`) for the local MTA to deliver. No SMTP
//! session is opened here.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::NotificationSink;
use crate::error::NotifyError;
use crate::logic::alert::Alert;

const DEFAULT_SENDER: &str = "crisis-monitor@localhost";

pub struct EmailSink {
    recipient: Option<String>,
    sender: String,
    outbox: PathBuf,
}

impl EmailSink {
    pub fn new(recipient: Option<String>, outbox: &Path) -> Self {
        Self {
            recipient,
            sender: DEFAULT_SENDER.to_string(),
            outbox: outbox.to_path_buf(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn message_path(&self, alert_id: &str) -> PathBuf {
        self.outbox.join(format!("{}.eml", alert_id))
    }

    fn render(&self, recipient: &str, alert: &Alert) -> String {
        let mut body = format!(
            "Crisis alert triggered: {}\n\nSeverity: {}\nRisk score: {:.3}\nCreated: {}\nMachine: {} ({} {})\n\nWindow: {} samples over {:.0} min (avg {:.3}, max {:.3})\n",
            alert.alert_id,
            alert.severity,
            alert.risk_score,
            alert.created_at.to_rfc3339(),
            alert.machine_info.hostname,
            alert.machine_info.platform,
            alert.machine_info.platform_version,
            alert.window_snapshot.sample_count,
            alert.window_snapshot.window_minutes,
            alert.window_snapshot.avg_score,
            alert.window_snapshot.max_score,
        );

        body.push_str(&format!(
            "Evidence: {} screenshots, webcam: {}\n",
            alert.evidence.screenshot_refs.len(),
            if alert.evidence.webcam_ref.is_some() { "yes" } else { "no" }
        ));
        for path in alert.evidence.screenshot_refs.iter().chain(alert.evidence.webcam_ref.iter()) {
            body.push_str(&format!("  - {}\n", path.display()));
        }

        format!(
            "From: {}\r\nTo: {}\r\nSubject: Crisis Alert - {}\r\nDate: {}\r\nMessage-ID: <{}@{}>\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            self.sender,
            recipient,
            alert.severity,
            alert.created_at.to_rfc2822(),
            alert.alert_id,
            alert.machine_info.hostname,
            body.replace('\n', "\r\n"),
        )
    }
}

impl NotificationSink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let recipient = match &self.recipient {
            Some(r) => r,
            None => {
                log::warn!("Email notification requested but no admin email configured");
                return Err(NotifyError::NotConfigured("admin_email".to_string()));
            }
        };

        if !recipient.contains('@') {
            return Err(NotifyError::Format(format!("invalid recipient: {}", recipient)));
        }

        fs::create_dir_all(&self.outbox)?;
        let path = self.message_path(&alert.alert_id);
        let tmp = self.outbox.join(format!(".{}.eml.tmp", alert.alert_id));

        let mut file = fs::File::create(&tmp)?;
        file.write_all(self.render(recipient, alert).as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        log::info!("Alert email queued for {}: {}", recipient, path.display());
        Ok(())
    }
}
