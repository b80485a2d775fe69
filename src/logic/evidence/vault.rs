//! Evidence Vault
//!
//! Copies referenced evidence into `<root>/<alert_id>/` so it survives the
//! caller's own rotation. Each copy is hashed (SHA-256). A failed copy is
//! logged and recorded in `missing`; it never fails the whole bundle.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::types::EvidenceBundle;

pub struct EvidenceVault {
    root: PathBuf,
}

impl EvidenceVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding one alert's evidence
    pub fn alert_dir(&self, alert_id: &str) -> PathBuf {
        self.root.join(alert_id)
    }

    /// Copy the bundle into the alert folder and return the preserved bundle.
    pub fn preserve(&self, alert_id: &str, bundle: &EvidenceBundle) -> EvidenceBundle {
        let mut preserved = EvidenceBundle {
            missing: bundle.missing.clone(),
            ..Default::default()
        };

        let dir = self.alert_dir(alert_id);
        if let Err(e) = fs::create_dir_all(&dir) {
            log::error!("Cannot create evidence folder {}: {}", dir.display(), e);
            preserved.missing.extend(
                bundle
                    .screenshot_refs
                    .iter()
                    .chain(bundle.webcam_ref.iter())
                    .map(|p| p.display().to_string()),
            );
            return preserved;
        }

        for (i, source) in bundle.screenshot_refs.iter().enumerate() {
            let dest = dir.join(format!("screenshot_{}.{}", i, extension_of(source, "png")));
            match copy_with_digest(source, &dest) {
                Ok(digest) => {
                    preserved.digests.insert(file_name_of(&dest), digest);
                    preserved.screenshot_refs.push(dest);
                }
                Err(e) => {
                    log::warn!("Skipping screenshot {}: {}", source.display(), e);
                    preserved.missing.push(source.display().to_string());
                }
            }
        }

        if let Some(source) = &bundle.webcam_ref {
            let dest = dir.join(format!("webcam.{}", extension_of(source, "jpg")));
            match copy_with_digest(source, &dest) {
                Ok(digest) => {
                    preserved.digests.insert(file_name_of(&dest), digest);
                    preserved.webcam_ref = Some(dest);
                }
                Err(e) => {
                    log::warn!("Skipping webcam frame {}: {}", source.display(), e);
                    preserved.missing.push(source.display().to_string());
                }
            }
        }

        log::info!(
            "Evidence collected: {} screenshots, webcam: {}",
            preserved.screenshot_refs.len(),
            preserved.webcam_ref.is_some()
        );

        preserved
    }

    /// Remove an alert folder whose record was never written.
    pub fn discard(&self, alert_id: &str) {
        let dir = self.alert_dir(alert_id);
        if !dir.exists() {
            return;
        }
        match fs::remove_dir_all(&dir) {
            Ok(()) => log::info!("Discarded orphaned evidence {}", dir.display()),
            Err(e) => log::warn!("Failed to discard evidence {}: {}", dir.display(), e),
        }
    }
}

fn extension_of(path: &Path, fallback: &str) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn copy_with_digest(source: &Path, dest: &Path) -> std::io::Result<String> {
    fs::copy(source, dest)?;
    calculate_file_hash(dest)
}

pub fn calculate_file_hash(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
