use super::NotificationSink;
use crate::error::NotifyError;
use crate::logic::alert::Alert;

/// Writes one line per alert to the system log.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        log::error!(
            "CRISIS ALERT: {} | Severity: {} | Risk: {:.3} | Machine: {}",
            alert.alert_id,
            alert.severity,
            alert.risk_score,
            alert.machine_info.hostname
        );
        Ok(())
    }
}
