//! Alert Store
//!
//! One pretty-printed JSON document per alert at `<dir>/<alert_id>.json`.
//! Writes go to a hidden temp file, are fsynced, then renamed into place,
//! so a record is never observable half-written.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::types::Alert;
use crate::error::{AlertError, AlertResult};

const RECORD_EXT: &str = "json";

pub struct AlertStore {
    dir: PathBuf,
}

impl AlertStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            log::warn!("Failed to create alert directory {}: {}", dir.display(), e);
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, alert_id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", alert_id, RECORD_EXT))
    }

    /// Write a brand-new record. Refuses to overwrite an existing id.
    pub fn persist_new(&self, alert: &Alert) -> AlertResult<PathBuf> {
        let path = self.record_path(&alert.alert_id);
        if path.exists() {
            return Err(AlertError::DuplicateId(alert.alert_id.clone()));
        }
        self.write_atomic(alert, &path)?;
        Ok(path)
    }

    /// Replace an existing record (status transitions only).
    pub fn rewrite(&self, alert: &Alert) -> AlertResult<PathBuf> {
        let path = self.record_path(&alert.alert_id);
        if !path.exists() {
            return Err(AlertError::NotFound(alert.alert_id.clone()));
        }
        self.write_atomic(alert, &path)?;
        Ok(path)
    }

    pub fn load(&self, alert_id: &str) -> AlertResult<Alert> {
        let path = self.record_path(alert_id);
        if !path.exists() {
            return Err(AlertError::NotFound(alert_id.to_string()));
        }
        read_record(&path)
    }

    /// All readable records, newest first. Corrupt files are skipped.
    pub fn list(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .record_files()
            .into_iter()
            .filter_map(|path| match read_record(&path) {
                Ok(alert) => Some(alert),
                Err(e) => {
                    log::warn!("Skipping unreadable alert record: {}", e);
                    None
                }
            })
            .collect();

        alerts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.alert_id.cmp(&a.alert_id))
        });
        alerts
    }

    /// Highest id sequence already on disk, so a restarted manager keeps counting.
    pub fn max_sequence(&self) -> u64 {
        self.record_files()
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).and_then(parse_sequence))
            .max()
            .unwrap_or(0)
    }

    fn record_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == RECORD_EXT))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| !n.starts_with('.'))
            })
            .collect()
    }

    fn write_atomic(&self, alert: &Alert, path: &Path) -> AlertResult<()> {
        let json = serde_json::to_vec_pretty(alert)?;
        let tmp = self.dir.join(format!(".{}.{}.tmp", alert.alert_id, RECORD_EXT));

        let persistence = |source: std::io::Error| AlertError::Persistence {
            alert_id: alert.alert_id.clone(),
            path: path.to_path_buf(),
            source,
        };

        let write_tmp = || -> std::io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            let mut file = File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()
        };

        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp);
            return Err(persistence(e));
        }

        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            persistence(e)
        })?;

        log::info!("Alert saved: {}", path.display());
        Ok(())
    }
}

fn read_record(path: &Path) -> AlertResult<Alert> {
    let content = fs::read_to_string(path).map_err(|source| AlertError::Persistence {
        alert_id: path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| AlertError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// `ALERT_<date>_<time>_<seq>` -> seq
pub fn parse_sequence(alert_id: &str) -> Option<u64> {
    alert_id
        .strip_prefix("ALERT_")?
        .rsplit('_')
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("ALERT_20260101_120000_000042"), Some(42));
        assert_eq!(parse_sequence("ALERT_20260101_120000_x"), None);
        assert_eq!(parse_sequence("alert_summary"), None);
    }
}
