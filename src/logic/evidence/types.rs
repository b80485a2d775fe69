//! Evidence Types

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Auxiliary artifacts attached to one alert.
///
/// Before preservation the refs point at the caller's files; after
/// preservation they point into the alert-scoped evidence folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// Oldest first, at most `MAX_EVIDENCE_SCREENSHOTS`
    pub screenshot_refs: Vec<PathBuf>,
    pub webcam_ref: Option<PathBuf>,

    /// Items that could not be captured or preserved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,

    /// SHA-256 of each preserved file, keyed by file name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub digests: BTreeMap<String, String>,
}

impl EvidenceBundle {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}
