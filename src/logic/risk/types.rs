//! Risk Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One distress score as received from the scoring pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
}

/// Window statistics, recomputed on every query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub sample_count: usize,
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub aggregate_risk: f64,
    pub window_minutes: f64,
}

impl RiskSnapshot {
    pub fn empty(window_minutes: f64) -> Self {
        Self {
            sample_count: 0,
            avg_score: 0.0,
            max_score: 0.0,
            min_score: 0.0,
            aggregate_risk: 0.0,
            window_minutes,
        }
    }
}

/// Cooldown bookkeeping owned by one decision gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub last_alert_time: Option<DateTime<Utc>>,
    pub alert_count: u64,
}

/// Gate phase, derived from `AlertState` and the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatePhase {
    /// Eligible to fire
    Armed,
    /// Inside the cooldown after an accepted alert
    Cooling,
}

impl GatePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatePhase::Armed => "ARMED",
            GatePhase::Cooling => "COOLING",
        }
    }
}

/// Result of one gate evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub evaluated_at: DateTime<Utc>,
    pub triggered: bool,
    /// Phase after this evaluation
    pub phase: GatePhase,
    pub snapshot: RiskSnapshot,
}
