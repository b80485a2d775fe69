//! Monitor Loop - Bridges score producer -> decision gate -> alert
//!
//! The producer (capture + scoring pipeline) appends samples through a
//! `ProducerHandle`. The consumer loop evaluates the gate periodically and,
//! on a positive decision, collects evidence and triggers the alert.
//! Evidence and persistence I/O happen after every engine lock is released.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{AlertResult, RiskError};
use crate::logic::alert::{Alert, AlertManager};
use crate::logic::config::MonitorConfig;
use crate::logic::evidence::{
    CommandCapture, EvidenceCoordinator, FrameCapture, NoCamera, ScreenshotHistory,
};
use crate::logic::risk::{DecisionGate, SlidingWindowAggregator};

/// Stop-flag poll granularity while sleeping between evaluations
const STOP_POLL_MS: u64 = 100;

/// Producer-side handle: appends scores and screenshot references.
#[derive(Clone)]
pub struct ProducerHandle {
    aggregator: Arc<SlidingWindowAggregator>,
    screenshots: Arc<Mutex<ScreenshotHistory>>,
}

impl ProducerHandle {
    /// Record one scored capture. The screenshot is only remembered
    /// when the score is accepted.
    pub fn record(
        &self,
        score: f64,
        timestamp: DateTime<Utc>,
        screenshot: Option<PathBuf>,
    ) -> Result<(), RiskError> {
        self.aggregator.add(score, timestamp)?;
        if let Some(path) = screenshot {
            self.screenshots.lock().push(path);
        }
        Ok(())
    }

    pub fn record_now(&self, score: f64, screenshot: Option<PathBuf>) -> Result<(), RiskError> {
        self.record(score, Utc::now(), screenshot)
    }
}

pub struct Monitor {
    gate: DecisionGate,
    coordinator: EvidenceCoordinator,
    manager: AlertManager,
    screenshots: Arc<Mutex<ScreenshotHistory>>,
    camera: Mutex<Box<dyn FrameCapture>>,
    stop: Arc<AtomicBool>,
    interval: Duration,
}

impl Monitor {
    pub fn new(config: &MonitorConfig, manager: AlertManager, camera: Box<dyn FrameCapture>) -> Self {
        Self {
            gate: DecisionGate::new(&config.risk),
            coordinator: EvidenceCoordinator::new(config.evidence.max_screenshots),
            manager,
            screenshots: Arc::new(Mutex::new(ScreenshotHistory::new())),
            camera: Mutex::new(camera),
            stop: Arc::new(AtomicBool::new(false)),
            interval: Duration::from_millis(config.evaluate_interval_ms.max(1)),
        }
    }

    /// Wire everything from configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let camera: Box<dyn FrameCapture> = match &config.evidence.webcam_command {
            Some(cmd) => Box::new(CommandCapture::new(
                cmd.clone(),
                config.evidence.webcam_capture_dir.clone(),
            )),
            None => Box::new(NoCamera),
        };
        Self::new(config, AlertManager::from_config(config), camera)
    }

    pub fn producer(&self) -> ProducerHandle {
        ProducerHandle {
            aggregator: self.gate.aggregator(),
            screenshots: Arc::clone(&self.screenshots),
        }
    }

    pub fn gate(&self) -> &DecisionGate {
        &self.gate
    }

    pub fn manager(&self) -> &AlertManager {
        &self.manager
    }

    /// One consumer iteration at `now`.
    ///
    /// `Ok(None)` covers every silent outcome (below threshold, too few
    /// samples, cooling). `Err` means the alert could not be recorded.
    pub fn tick(&self, now: DateTime<Utc>) -> AlertResult<Option<Alert>> {
        let decision = self.gate.evaluate_detailed(now);
        if !decision.triggered {
            return Ok(None);
        }

        log::info!("Collecting evidence (risk {:.3})", decision.snapshot.aggregate_risk);

        let recent = self.screenshots.lock().snapshot();
        let bundle = {
            let mut camera = self.camera.lock();
            self.coordinator.collect_with(&recent, camera.as_mut())
        };

        let alert = self.manager.trigger_at(
            now,
            decision.snapshot.aggregate_risk,
            &decision.snapshot,
            &bundle,
        )?;
        log::info!("Alert created: {}", alert.alert_id);
        Ok(Some(alert))
    }

    /// Cooperative stop flag, checked between iterations.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Run the consumer loop on the current thread until stopped.
    pub fn run(&self) {
        log::info!(
            "Monitor loop started (interval {} ms, threshold {})",
            self.interval.as_millis(),
            self.gate.threshold()
        );

        while !self.is_stopped() {
            if let Err(e) = self.tick(Utc::now()) {
                log::error!("FAILED TO RECORD CRISIS ALERT: {}", e);
            }
            self.sleep_interval();
        }

        log::info!("Monitor loop stopped");
    }

    /// Spawn the consumer loop on its own thread.
    pub fn start(self: Arc<Self>) -> thread::JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn sleep_interval(&self) {
        let mut remaining = self.interval;
        let slice = Duration::from_millis(STOP_POLL_MS);
        while !remaining.is_zero() && !self.is_stopped() {
            let step = remaining.min(slice);
            thread::sleep(step);
            remaining -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::alert::test_support::machine;
    use crate::logic::alert::{AlertStatus, AlertStore};
    use crate::logic::config::RiskConfig;
    use crate::logic::evidence::EvidenceVault;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn monitor(root: &Path, camera: Box<dyn FrameCapture>) -> Monitor {
        let config = MonitorConfig {
            risk: RiskConfig::from_minutes(5, 0.65, 3, 2),
            evaluate_interval_ms: 10,
            ..Default::default()
        };
        let manager = AlertManager::new(
            AlertStore::new(root.join("alerts")),
            EvidenceVault::new(root.join("evidence")),
            vec![],
        )
        .with_machine_info(machine());
        Monitor::new(&config, manager, camera)
    }

    fn feed(monitor: &Monitor, dir: &Path, scores: &[f64]) {
        let producer = monitor.producer();
        for (i, score) in scores.iter().enumerate() {
            let shot = dir.join(format!("screenshot_{:02}.png", i));
            fs::write(&shot, "png").unwrap();
            producer
                .record(*score, t0() + ChronoDuration::seconds(i as i64 * 20), Some(shot))
                .unwrap();
        }
    }

    #[test]
    fn test_tick_creates_alert_with_evidence() {
        let root = TempDir::new().unwrap();
        let shots = TempDir::new().unwrap();
        let mon = monitor(root.path(), Box::new(NoCamera));
        feed(&mon, shots.path(), &[0.9; 8]);

        let now = t0() + ChronoDuration::seconds(140);
        let alert = mon.tick(now).unwrap().expect("alert expected");

        assert_eq!(alert.status, AlertStatus::New);
        assert_eq!(alert.evidence.screenshot_refs.len(), 5);
        assert!(alert.evidence.webcam_ref.is_none());
        assert_eq!(alert.risk_score, alert.window_snapshot.aggregate_risk);
        assert_eq!(mon.manager().list().len(), 1);

        // Cooling: same risk, no second alert
        assert!(mon.tick(now + ChronoDuration::seconds(30)).unwrap().is_none());
        assert_eq!(mon.manager().list().len(), 1);
    }

    #[test]
    fn test_tick_is_silent_below_threshold() {
        let root = TempDir::new().unwrap();
        let shots = TempDir::new().unwrap();
        let mon = monitor(root.path(), Box::new(NoCamera));
        feed(&mon, shots.path(), &[0.2, 0.3, 0.1, 0.2]);

        assert!(mon.tick(t0() + ChronoDuration::seconds(60)).unwrap().is_none());
        assert!(mon.manager().list().is_empty());
    }

    #[test]
    fn test_webcam_frame_is_attached() {
        let root = TempDir::new().unwrap();
        let shots = TempDir::new().unwrap();
        let frame = shots.path().join("frame.jpg");
        fs::write(&frame, "jpg").unwrap();

        let captured = frame.clone();
        let mon = monitor(root.path(), Box::new(move || Some(captured.clone())));
        feed(&mon, shots.path(), &[0.8, 0.85, 0.9]);

        let alert = mon.tick(t0() + ChronoDuration::seconds(40)).unwrap().unwrap();
        let webcam = alert.evidence.webcam_ref.unwrap();
        assert!(webcam.starts_with(root.path().join("evidence")));
        assert_eq!(fs::read_to_string(webcam).unwrap(), "jpg");
    }

    #[test]
    fn test_invalid_score_does_not_record_screenshot() {
        let root = TempDir::new().unwrap();
        let mon = monitor(root.path(), Box::new(NoCamera));
        let producer = mon.producer();

        let result = producer.record(1.5, t0(), Some(PathBuf::from("shot.png")));
        assert_eq!(result, Err(RiskError::InvalidScore { score: 1.5 }));
        assert!(mon.screenshots.lock().is_empty());
        assert!(mon.gate().aggregator().is_empty());
    }

    #[test]
    fn test_run_stops_on_flag() {
        let root = TempDir::new().unwrap();
        let mon = Arc::new(monitor(root.path(), Box::new(NoCamera)));
        let stop = mon.stop_handle();

        let handle = Arc::clone(&mon).start();
        thread::sleep(Duration::from_millis(30));
        stop.store(true, Ordering::SeqCst);

        handle.join().unwrap();
        assert!(mon.is_stopped());
    }
}
