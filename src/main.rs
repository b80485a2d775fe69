//! Crisis Monitor - Main Entry Point
//!
//! Producer: reads `<score> [screenshot_path]` lines from stdin.
//! Consumer: the monitor loop, evaluating the gate every interval.
//! EOF on stdin stops both.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use chrono::Utc;

use crisis_detection_core::constants::{APP_NAME, APP_VERSION};
use crisis_detection_core::{Monitor, MonitorConfig, ProducerHandle};

fn parse_line(line: &str) -> Option<(f64, Option<PathBuf>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let score = match parts.next()?.parse::<f64>() {
        Ok(s) => s,
        Err(_) => {
            log::warn!("Ignoring malformed line: {}", line);
            return None;
        }
    };
    let screenshot = parts
        .next()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    Some((score, screenshot))
}

fn read_scores(producer: ProducerHandle) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                break;
            }
        };

        if let Some((score, screenshot)) = parse_line(&line) {
            if let Err(e) = producer.record_now(score, screenshot) {
                log::warn!("Sample rejected: {}", e);
            }
        }
    }
    log::info!("Score stream closed");
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = MonitorConfig::from_env();
    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    log::info!(
        "Risk window {} min, threshold {}, min samples {}, cooldown {} min",
        config.risk.window_secs / 60,
        config.risk.alert_threshold,
        config.risk.min_samples,
        config.risk.cooldown_secs / 60
    );

    let monitor = Arc::new(Monitor::from_config(&config));
    log::info!("Notification sinks: {:?}", monitor.manager().sink_names());

    let producer = monitor.producer();
    let reader = thread::spawn(move || read_scores(producer));
    let consumer = Arc::clone(&monitor).start();

    if reader.join().is_err() {
        log::error!("Producer thread panicked");
    }

    monitor.stop();
    if consumer.join().is_err() {
        log::error!("Monitor thread panicked");
        return ExitCode::FAILURE;
    }

    // Samples that arrived after the last loop iteration
    if let Err(e) = monitor.tick(Utc::now()) {
        log::error!("FAILED TO RECORD CRISIS ALERT: {}", e);
        return ExitCode::FAILURE;
    }

    let stats = monitor.manager().stats();
    log::info!(
        "Shutdown: {} alerts, {} notifications sent, {} failed",
        stats.alerts_created,
        stats.notifications_sent,
        stats.notifications_failed
    );
    ExitCode::SUCCESS
}
