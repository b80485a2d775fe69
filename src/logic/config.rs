//! Monitor Configuration
//!
//! Settings for the risk engine, alert manager and evidence collection.
//! Defaults live in `constants.rs`; `from_env` applies `CRISIS_*` overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{self, env_list, env_opt, env_or};
use crate::error::ConfigError;
use crate::logic::alert::Severity;

/// Upper bound for window and cooldown lengths (one year)
const MAX_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

/// Risk aggregation and decision gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Trailing window length (seconds)
    pub window_secs: u64,

    /// Aggregate risk at or above which an alert fires (0.0 - 1.0)
    pub alert_threshold: f64,

    /// Minimum in-window samples before risk may be non-zero
    pub min_samples: usize,

    /// Minimum time between two accepted alerts (seconds)
    pub cooldown_secs: u64,

    /// Ring buffer capacity (oldest samples evicted first)
    pub buffer_capacity: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            window_secs: constants::DEFAULT_WINDOW_SECS,
            alert_threshold: constants::DEFAULT_ALERT_THRESHOLD,
            min_samples: constants::DEFAULT_MIN_SAMPLES,
            cooldown_secs: constants::DEFAULT_COOLDOWN_SECS,
            buffer_capacity: constants::DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl RiskConfig {
    /// Build from minute-based values, the unit operators think in.
    pub fn from_minutes(window_minutes: u64, threshold: f64, min_samples: usize, cooldown_minutes: u64) -> Self {
        Self {
            window_secs: window_minutes.saturating_mul(60),
            alert_threshold: threshold,
            min_samples,
            cooldown_secs: cooldown_minutes.saturating_mul(60),
            ..Default::default()
        }
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_secs == 0 {
            return Err(ConfigError::Invalid("window_secs must be > 0".into()));
        }
        if self.window_secs > MAX_PERIOD_SECS || self.cooldown_secs > MAX_PERIOD_SECS {
            return Err(ConfigError::Invalid(format!(
                "window_secs and cooldown_secs must be <= {}",
                MAX_PERIOD_SECS
            )));
        }
        if !(self.alert_threshold > 0.0 && self.alert_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alert_threshold must be within (0, 1], got {}",
                self.alert_threshold
            )));
        }
        if self.min_samples == 0 {
            return Err(ConfigError::Invalid("min_samples must be >= 1".into()));
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::Invalid("buffer_capacity must be >= 1".into()));
        }
        Ok(())
    }
}

/// Notification method selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    Log,
    File,
    Email,
    Webhook,
}

impl NotificationMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "log" => Some(Self::Log),
            "file" => Some(Self::File),
            "email" => Some(Self::Email),
            "webhook" => Some(Self::Webhook),
            _ => None,
        }
    }
}

/// Alert persistence and notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Directory holding one JSON record per alert
    pub alert_log_dir: PathBuf,

    /// Sinks to fan out to, in order
    pub notification_methods: Vec<NotificationMethod>,

    /// Recipient for the email sink
    pub admin_email: Option<String>,

    /// Pickup directory the email sink writes messages into
    pub email_outbox_dir: PathBuf,

    /// Target for the webhook sink
    pub webhook_url: Option<String>,

    /// Alerts below this severity are not posted to the webhook
    #[serde(default = "default_webhook_min_severity")]
    pub webhook_min_severity: Severity,
}

fn default_webhook_min_severity() -> Severity {
    Severity::Low
}

impl Default for AlertConfig {
    fn default() -> Self {
        let alert_log_dir = PathBuf::from(constants::DEFAULT_ALERT_LOG_DIR);
        Self {
            email_outbox_dir: alert_log_dir.join("outbox"),
            alert_log_dir,
            notification_methods: vec![NotificationMethod::Log, NotificationMethod::File],
            admin_email: None,
            webhook_url: None,
            webhook_min_severity: default_webhook_min_severity(),
        }
    }
}

/// Evidence collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Root of the alert-scoped evidence folders
    pub evidence_dir: PathBuf,

    /// Screenshots attached per alert (most recent first kept)
    pub max_screenshots: usize,

    /// Shell command grabbing one webcam frame; `{output}` is replaced by the target path
    pub webcam_command: Option<String>,

    /// Where raw webcam frames land before being preserved
    pub webcam_capture_dir: PathBuf,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        let evidence_dir = PathBuf::from(constants::DEFAULT_EVIDENCE_DIR);
        Self {
            webcam_capture_dir: evidence_dir.join("webcam_captures"),
            evidence_dir,
            max_screenshots: constants::MAX_EVIDENCE_SCREENSHOTS,
            webcam_command: None,
        }
    }
}

/// Full monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub risk: RiskConfig,
    pub alerts: AlertConfig,
    pub evidence: EvidenceConfig,

    /// Consumer loop evaluation interval (milliseconds)
    #[serde(default = "default_interval")]
    pub evaluate_interval_ms: u64,
}

fn default_interval() -> u64 {
    constants::DEFAULT_EVALUATE_INTERVAL_MS
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            risk: RiskConfig::default(),
            alerts: AlertConfig::default(),
            evidence: EvidenceConfig::default(),
            evaluate_interval_ms: default_interval(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let base = constants::data_dir();
        let risk_default = RiskConfig::default();

        let risk = RiskConfig {
            window_secs: env_or("CRISIS_WINDOW_MINUTES", risk_default.window_secs / 60).saturating_mul(60),
            alert_threshold: env_or("CRISIS_ALERT_THRESHOLD", risk_default.alert_threshold),
            min_samples: env_or("CRISIS_MIN_SAMPLES", risk_default.min_samples),
            cooldown_secs: env_or("CRISIS_COOLDOWN_MINUTES", risk_default.cooldown_secs / 60).saturating_mul(60),
            buffer_capacity: env_or("CRISIS_BUFFER_CAPACITY", risk_default.buffer_capacity),
        };

        let alert_log_dir = env_opt("CRISIS_ALERT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base.join("logs").join("alerts"));

        let notification_methods = env_list("CRISIS_NOTIFY")
            .map(|items| {
                items
                    .iter()
                    .filter_map(|m| {
                        let parsed = NotificationMethod::parse(m);
                        if parsed.is_none() {
                            log::warn!("Ignoring unknown notification method: {}", m);
                        }
                        parsed
                    })
                    .collect()
            })
            .unwrap_or_else(|| AlertConfig::default().notification_methods);

        let alerts = AlertConfig {
            email_outbox_dir: env_opt("CRISIS_EMAIL_OUTBOX")
                .map(PathBuf::from)
                .unwrap_or_else(|| alert_log_dir.join("outbox")),
            alert_log_dir,
            notification_methods,
            admin_email: env_opt("CRISIS_ADMIN_EMAIL"),
            webhook_url: env_opt("CRISIS_WEBHOOK_URL"),
            webhook_min_severity: env_opt("CRISIS_WEBHOOK_MIN_SEVERITY")
                .and_then(|s| {
                    let parsed = Severity::parse(&s);
                    if parsed.is_none() {
                        log::warn!("Ignoring unknown webhook severity: {}", s);
                    }
                    parsed
                })
                .unwrap_or_else(default_webhook_min_severity),
        };

        let evidence_dir = env_opt("CRISIS_EVIDENCE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base.join("evidence"));

        let evidence = EvidenceConfig {
            webcam_capture_dir: evidence_dir.join("webcam_captures"),
            evidence_dir,
            max_screenshots: env_or("CRISIS_MAX_SCREENSHOTS", constants::MAX_EVIDENCE_SCREENSHOTS),
            webcam_command: env_opt("CRISIS_WEBCAM_COMMAND"),
        };

        Self {
            risk,
            alerts,
            evidence,
            evaluate_interval_ms: env_or("CRISIS_EVALUATE_INTERVAL_MS", default_interval()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.validate()?;
        if self.evidence.max_screenshots > constants::SCREENSHOT_HISTORY_CAP {
            return Err(ConfigError::Invalid(format!(
                "max_screenshots must be <= {}",
                constants::SCREENSHOT_HISTORY_CAP
            )));
        }
        Ok(())
    }
}
