use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use super::manager::AlertManager;
use super::store::AlertStore;
use super::test_support::{machine, snapshot};
use super::types::{AlertStatus, Severity};
use crate::error::{AlertError, NotifyError};
use crate::logic::evidence::{EvidenceBundle, EvidenceVault};
use crate::logic::notify::NotificationSink;

struct CountingSink {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl NotificationSink for CountingSink {
    fn name(&self) -> &str {
        self.name
    }

    fn notify(&self, _alert: &super::Alert) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(NotifyError::Network("unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

fn sink(name: &'static str, calls: &Arc<AtomicUsize>, fail: bool) -> Box<dyn NotificationSink> {
    Box::new(CountingSink {
        name,
        calls: Arc::clone(calls),
        fail,
    })
}

fn manager(root: &Path, sinks: Vec<Box<dyn NotificationSink>>) -> AlertManager {
    AlertManager::new(
        AlertStore::new(root.join("alerts")),
        EvidenceVault::new(root.join("evidence")),
        sinks,
    )
    .with_machine_info(machine())
}

fn screenshots(dir: &Path, n: usize) -> Vec<PathBuf> {
    (0..n)
        .map(|i| {
            let path = dir.join(format!("screenshot_{}.png", i));
            fs::write(&path, format!("png-{}", i)).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_trigger_persists_record_before_returning() {
    let root = TempDir::new().unwrap();
    let mgr = manager(root.path(), vec![]);
    let src = TempDir::new().unwrap();

    let evidence = EvidenceBundle {
        screenshot_refs: screenshots(src.path(), 2),
        ..Default::default()
    };
    let alert = mgr.trigger(0.87, &snapshot(0.87), &evidence).unwrap();

    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.status, AlertStatus::New);
    assert!(alert.alert_id.starts_with("ALERT_"));

    let record_path = mgr.store().record_path(&alert.alert_id);
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&record_path).unwrap()).unwrap();
    assert_eq!(raw["status"], "NEW");
    assert_eq!(raw["severity"], "CRITICAL");
    assert_eq!(raw["machine_info"]["hostname"], "lab-pc-07");
    assert_eq!(raw["window_snapshot"]["sample_count"], 7);

    assert_eq!(mgr.load(&alert.alert_id).unwrap(), alert);
}

#[test]
fn test_evidence_is_copied_under_alert_id() {
    let root = TempDir::new().unwrap();
    let mgr = manager(root.path(), vec![]);
    let src = TempDir::new().unwrap();

    let cam = src.path().join("frame.jpg");
    fs::write(&cam, "jpeg").unwrap();
    let evidence = EvidenceBundle {
        screenshot_refs: screenshots(src.path(), 3),
        webcam_ref: Some(cam),
        ..Default::default()
    };

    let alert = mgr.trigger(0.7, &snapshot(0.7), &evidence).unwrap();
    let alert_dir = root.path().join("evidence").join(&alert.alert_id);

    assert_eq!(alert.evidence.screenshot_refs.len(), 3);
    for path in &alert.evidence.screenshot_refs {
        assert!(path.starts_with(&alert_dir));
        assert!(path.exists());
    }
    assert_eq!(alert.evidence.webcam_ref, Some(alert_dir.join("webcam.jpg")));
    assert_eq!(alert.evidence.digests.len(), 4);
}

#[test]
fn test_missing_webcam_does_not_fail_trigger() {
    let root = TempDir::new().unwrap();
    let mgr = manager(root.path(), vec![]);

    let evidence = EvidenceBundle {
        missing: vec!["webcam".to_string()],
        ..Default::default()
    };
    let alert = mgr.trigger(0.66, &snapshot(0.66), &evidence).unwrap();

    assert!(alert.evidence.webcam_ref.is_none());
    assert_eq!(alert.evidence.missing, vec!["webcam".to_string()]);
    assert_eq!(alert.severity, Severity::Medium);
}

#[test]
fn test_sink_failures_are_isolated() {
    let root = TempDir::new().unwrap();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let third = Arc::new(AtomicUsize::new(0));

    let mgr = manager(
        root.path(),
        vec![
            sink("flaky-a", &first, true),
            sink("ok", &second, false),
            sink("flaky-b", &third, true),
        ],
    );

    let alert = mgr.trigger(0.9, &snapshot(0.9), &EvidenceBundle::default());
    assert!(alert.is_ok());
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(third.load(Ordering::SeqCst), 1);

    let stats = mgr.stats();
    assert_eq!(stats.alerts_created, 1);
    assert_eq!(stats.notifications_sent, 1);
    assert_eq!(stats.notifications_failed, 2);
}

#[test]
fn test_persistence_failure_is_fatal_and_skips_notifications() {
    let root = TempDir::new().unwrap();
    // A regular file where the alert directory should be
    let blocked = root.path().join("alerts");
    fs::write(&blocked, "not a directory").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let mgr = manager(root.path(), vec![sink("log", &calls, false)]);
    let src = TempDir::new().unwrap();
    let evidence = EvidenceBundle {
        screenshot_refs: screenshots(src.path(), 2),
        ..Default::default()
    };

    let result = mgr.trigger(0.9, &snapshot(0.9), &evidence);
    assert!(matches!(result, Err(AlertError::Persistence { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(mgr.stats().alerts_created, 0);

    // No evidence folder is left without a record pointing to it
    let leftovers = fs::read_dir(root.path().join("evidence")).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_ids_unique_and_sortable_within_one_second() {
    let root = TempDir::new().unwrap();
    let mgr = manager(root.path(), vec![]);
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

    let ids: Vec<String> = (0..12)
        .map(|_| {
            mgr.trigger_at(now, 0.8, &snapshot(0.8), &EvidenceBundle::default())
                .unwrap()
                .alert_id
        })
        .collect();

    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted, ids);
    assert_eq!(ids[0], "ALERT_20260301_090000_000001");
    assert_eq!(ids[11], "ALERT_20260301_090000_000012");
}

#[test]
fn test_sequence_survives_restart() {
    let root = TempDir::new().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

    let first = manager(root.path(), vec![]);
    first.trigger_at(now, 0.8, &snapshot(0.8), &EvidenceBundle::default()).unwrap();
    first.trigger_at(now, 0.8, &snapshot(0.8), &EvidenceBundle::default()).unwrap();
    drop(first);

    let second = manager(root.path(), vec![]);
    let alert = second
        .trigger_at(now, 0.8, &snapshot(0.8), &EvidenceBundle::default())
        .unwrap();
    assert_eq!(alert.alert_id, "ALERT_20260301_090000_000003");
}

#[test]
fn test_status_transitions() {
    let root = TempDir::new().unwrap();
    let mgr = manager(root.path(), vec![]);
    let alert = mgr.trigger(0.75, &snapshot(0.75), &EvidenceBundle::default()).unwrap();

    let acked = mgr.acknowledge(&alert.alert_id).unwrap();
    assert_eq!(acked.status, AlertStatus::Acknowledged);
    assert_eq!(mgr.load(&alert.alert_id).unwrap().status, AlertStatus::Acknowledged);

    let closed = mgr.close(&alert.alert_id).unwrap();
    assert_eq!(closed.status, AlertStatus::Closed);

    // Everything except status is untouched
    let mut expected = alert.clone();
    expected.status = AlertStatus::Closed;
    assert_eq!(mgr.load(&alert.alert_id).unwrap(), expected);

    assert!(matches!(
        mgr.acknowledge(&alert.alert_id),
        Err(AlertError::InvalidTransition { .. })
    ));
    assert!(matches!(mgr.close("ALERT_missing"), Err(AlertError::NotFound(_))));
}

#[test]
fn test_concurrent_acknowledge_and_close_never_regress() {
    let root = TempDir::new().unwrap();
    let mgr = Arc::new(manager(root.path(), vec![]));

    for _ in 0..25 {
        let alert = mgr.trigger(0.8, &snapshot(0.8), &EvidenceBundle::default()).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let ack = {
            let (mgr, barrier, id) = (Arc::clone(&mgr), Arc::clone(&barrier), alert.alert_id.clone());
            thread::spawn(move || {
                barrier.wait();
                mgr.acknowledge(&id).is_ok()
            })
        };
        let close = {
            let (mgr, barrier, id) = (Arc::clone(&mgr), Arc::clone(&barrier), alert.alert_id.clone());
            thread::spawn(move || {
                barrier.wait();
                mgr.close(&id).is_ok()
            })
        };

        let _acked = ack.join().unwrap();
        assert!(close.join().unwrap());
        // Whatever the interleaving, CLOSED is terminal
        assert_eq!(mgr.load(&alert.alert_id).unwrap().status, AlertStatus::Closed);
    }
}

#[test]
fn test_no_temp_files_left_behind() {
    let root = TempDir::new().unwrap();
    let mgr = manager(root.path(), vec![]);
    let alert = mgr.trigger(0.8, &snapshot(0.8), &EvidenceBundle::default()).unwrap();
    mgr.acknowledge(&alert.alert_id).unwrap();

    let names: Vec<String> = fs::read_dir(root.path().join("alerts"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec![format!("{}.json", alert.alert_id)]);
}

#[test]
fn test_list_is_newest_first_and_skips_corrupt() {
    let root = TempDir::new().unwrap();
    let mgr = manager(root.path(), vec![]);
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

    let older = mgr.trigger_at(t0, 0.7, &snapshot(0.7), &EvidenceBundle::default()).unwrap();
    let newer = mgr
        .trigger_at(t0 + Duration::minutes(40), 0.9, &snapshot(0.9), &EvidenceBundle::default())
        .unwrap();
    fs::write(root.path().join("alerts").join("ALERT_broken.json"), "{ not json").unwrap();

    let listed: Vec<String> = mgr.list().into_iter().map(|a| a.alert_id).collect();
    assert_eq!(listed, vec![newer.alert_id, older.alert_id]);
}
