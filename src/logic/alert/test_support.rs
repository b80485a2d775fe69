use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use super::types::{Alert, AlertStatus, MachineInfo, Severity};
use crate::logic::evidence::EvidenceBundle;
use crate::logic::risk::RiskSnapshot;

pub fn machine() -> MachineInfo {
    MachineInfo {
        hostname: "lab-pc-07".to_string(),
        platform: "Linux".to_string(),
        platform_version: "24.04".to_string(),
    }
}

pub fn snapshot(risk: f64) -> RiskSnapshot {
    RiskSnapshot {
        sample_count: 7,
        avg_score: 0.74,
        max_score: 0.9,
        min_score: 0.6,
        aggregate_risk: risk,
        window_minutes: 15.0,
    }
}

pub fn sample_alert(risk: f64) -> Alert {
    Alert {
        alert_id: "ALERT_20260301_090000_000001".to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        risk_score: risk,
        window_snapshot: snapshot(risk),
        severity: Severity::from_risk(risk),
        evidence: EvidenceBundle {
            screenshot_refs: vec![PathBuf::from("evidence/screenshot_0.png")],
            webcam_ref: None,
            ..Default::default()
        },
        machine_info: machine(),
        status: AlertStatus::New,
    }
}
