use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::evidence::EvidenceBundle;
use crate::logic::risk::RiskSnapshot;

/// Reporting classification. Independent of the gate's alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Severity {
    /// Monotone step function with inclusive lower bounds.
    pub fn from_risk(risk: f64) -> Self {
        if risk >= 0.85 {
            Severity::Critical
        } else if risk >= 0.70 {
            Severity::High
        } else if risk >= 0.55 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Severity::Low => "#2ecc71",
            Severity::Medium => "#f1c40f",
            Severity::High => "#e67e22",
            Severity::Critical => "#e74c3c",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    New,
    Acknowledged,
    Closed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::New => "NEW",
            AlertStatus::Acknowledged => "ACKNOWLEDGED",
            AlertStatus::Closed => "CLOSED",
        }
    }

    /// Forward-only: NEW -> ACKNOWLEDGED -> CLOSED, or NEW -> CLOSED.
    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (AlertStatus::New, AlertStatus::Acknowledged)
                | (AlertStatus::New, AlertStatus::Closed)
                | (AlertStatus::Acknowledged, AlertStatus::Closed)
        )
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineInfo {
    pub hostname: String,
    pub platform: String,
    pub platform_version: String,
}

impl MachineInfo {
    pub fn collect() -> Self {
        Self {
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            platform: sysinfo::System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            platform_version: sysinfo::System::os_version().unwrap_or_default(),
        }
    }
}

/// One persisted crisis alert. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub created_at: DateTime<Utc>,
    pub risk_score: f64,
    pub window_snapshot: RiskSnapshot,
    pub severity: Severity,
    pub evidence: EvidenceBundle,
    pub machine_info: MachineInfo,
    pub status: AlertStatus,
}
