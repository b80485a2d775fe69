//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every default can be overridden through a `CRISIS_*` environment variable.

/// Default trailing window (seconds) - 15 minutes
pub const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

/// Default aggregate risk threshold for raising an alert
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.65;

/// Default minimum in-window samples before risk can be non-zero
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Default cooldown between two accepted alerts (seconds) - 30 minutes
pub const DEFAULT_COOLDOWN_SECS: u64 = 30 * 60;

/// Sample ring buffer capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Screenshots attached to one alert
pub const MAX_EVIDENCE_SCREENSHOTS: usize = 5;

/// Rolling screenshot history kept by the caller
pub const SCREENSHOT_HISTORY_CAP: usize = 10;

/// Consumer loop evaluation interval (milliseconds)
pub const DEFAULT_EVALUATE_INTERVAL_MS: u64 = 2_000;

/// Default alert record directory
pub const DEFAULT_ALERT_LOG_DIR: &str = "data/logs/alerts";

/// Default evidence directory
pub const DEFAULT_EVIDENCE_DIR: &str = "data/evidence";

/// Consolidated summary written by the file sink
pub const ALERT_SUMMARY_FILE: &str = "alert_summary.txt";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Crisis Monitor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Read a parseable value from the environment, falling back to `default`.
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Read an optional, non-empty string from the environment.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Read a comma separated list from the environment.
pub fn env_list(key: &str) -> Option<Vec<String>> {
    env_opt(key).map(|s| {
        s.split(',')
            .map(|item| item.trim().to_lowercase())
            .filter(|item| !item.is_empty())
            .collect()
    })
}

/// Base data directory used when no explicit directory is configured.
pub fn data_dir() -> std::path::PathBuf {
    env_opt("CRISIS_DATA_DIR")
        .map(std::path::PathBuf::from)
        .or_else(|| dirs::data_local_dir().map(|d| d.join("crisis-detection")))
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}
