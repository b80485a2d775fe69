//! Alert Lifecycle Manager
//!
//! `trigger` allocates an id, preserves evidence, persists the record and
//! only then fans out to notification sinks. Persistence failure is fatal;
//! notification failure never is.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::store::AlertStore;
use super::types::{Alert, AlertStatus, MachineInfo, Severity};
use crate::error::{AlertError, AlertResult};
use crate::logic::config::MonitorConfig;
use crate::logic::evidence::{EvidenceBundle, EvidenceVault};
use crate::logic::notify::{self, NotificationSink};
use crate::logic::risk::RiskSnapshot;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertStats {
    pub alerts_created: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
}

pub struct AlertManager {
    store: AlertStore,
    vault: EvidenceVault,
    sinks: Vec<Box<dyn NotificationSink>>,
    sequence: AtomicU64,
    machine_info: MachineInfo,
    stats: Mutex<AlertStats>,
    /// Serializes load -> check -> rewrite of status transitions
    status_lock: Mutex<()>,
}

impl AlertManager {
    pub fn new(store: AlertStore, vault: EvidenceVault, sinks: Vec<Box<dyn NotificationSink>>) -> Self {
        let sequence = AtomicU64::new(store.max_sequence());
        Self {
            store,
            vault,
            sinks,
            sequence,
            machine_info: MachineInfo::collect(),
            stats: Mutex::new(AlertStats::default()),
            status_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            AlertStore::new(&config.alerts.alert_log_dir),
            EvidenceVault::new(&config.evidence.evidence_dir),
            notify::build_sinks(&config.alerts),
        )
    }

    pub fn with_machine_info(mut self, machine_info: MachineInfo) -> Self {
        self.machine_info = machine_info;
        self
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn store(&self) -> &AlertStore {
        &self.store
    }

    /// Create, persist and announce an alert.
    pub fn trigger(
        &self,
        risk_score: f64,
        snapshot: &RiskSnapshot,
        evidence: &EvidenceBundle,
    ) -> AlertResult<Alert> {
        self.trigger_at(Utc::now(), risk_score, snapshot, evidence)
    }

    pub fn trigger_at(
        &self,
        now: DateTime<Utc>,
        risk_score: f64,
        snapshot: &RiskSnapshot,
        evidence: &EvidenceBundle,
    ) -> AlertResult<Alert> {
        let alert_id = self.allocate_id(now);
        let preserved = self.vault.preserve(&alert_id, evidence);

        let alert = Alert {
            alert_id,
            created_at: now,
            risk_score,
            window_snapshot: snapshot.clone(),
            severity: Severity::from_risk(risk_score),
            evidence: preserved,
            machine_info: self.machine_info.clone(),
            status: AlertStatus::New,
        };

        if let Err(e) = self.store.persist_new(&alert) {
            log::error!("ALERT NOT RECORDED ({}): {}", alert.alert_id, e);
            self.vault.discard(&alert.alert_id);
            return Err(e);
        }
        self.stats.lock().alerts_created += 1;

        self.fan_out(&alert);

        log::error!(
            "[CRISIS ALERT] {} triggered (Risk: {:.3}, Severity: {})",
            alert.alert_id,
            alert.risk_score,
            alert.severity
        );

        Ok(alert)
    }

    fn fan_out(&self, alert: &Alert) {
        let mut sent = 0;
        let mut failed = 0;

        for sink in &self.sinks {
            match sink.notify(alert) {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    log::warn!("Notification via {} failed for {}: {}", sink.name(), alert.alert_id, e);
                }
            }
        }

        let mut stats = self.stats.lock();
        stats.notifications_sent += sent;
        stats.notifications_failed += failed;
    }

    /// `ALERT_<YYYYmmdd_HHMMSS>_<seq>`; seq is zero-padded and never repeats.
    fn allocate_id(&self, now: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("ALERT_{}_{:06}", now.format("%Y%m%d_%H%M%S"), seq)
    }

    // ------------------------------------------------------------------
    // Status transitions
    // ------------------------------------------------------------------

    pub fn set_status(&self, alert_id: &str, status: AlertStatus) -> AlertResult<Alert> {
        let _guard = self.status_lock.lock();
        let mut alert = self.store.load(alert_id)?;

        if !alert.status.can_transition_to(status) {
            return Err(AlertError::InvalidTransition {
                alert_id: alert_id.to_string(),
                from: alert.status.to_string(),
                to: status.to_string(),
            });
        }

        let previous = alert.status;
        alert.status = status;
        self.store.rewrite(&alert)?;

        log::info!("Alert {} status: {} -> {}", alert_id, previous, status);
        Ok(alert)
    }

    pub fn acknowledge(&self, alert_id: &str) -> AlertResult<Alert> {
        self.set_status(alert_id, AlertStatus::Acknowledged)
    }

    pub fn close(&self, alert_id: &str) -> AlertResult<Alert> {
        self.set_status(alert_id, AlertStatus::Closed)
    }

    pub fn load(&self, alert_id: &str) -> AlertResult<Alert> {
        self.store.load(alert_id)
    }

    /// Newest first
    pub fn list(&self) -> Vec<Alert> {
        self.store.list()
    }

    pub fn stats(&self) -> AlertStats {
        self.stats.lock().clone()
    }
}
