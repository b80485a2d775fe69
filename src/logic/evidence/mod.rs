//! Evidence Module - Evidence capture for triggered alerts
//!
//! # Components
//! - `coordinator.rs`: Picks the last screenshots + one webcam frame
//! - `vault.rs`: Copies evidence into the alert-scoped folder (SHA-256 tagged)
//! - `webcam.rs`: Single-frame capture collaborators
//! - `history.rs`: Rolling screenshot list kept by the capture side

pub mod coordinator;
pub mod history;
pub mod types;
pub mod vault;
pub mod webcam;

pub use coordinator::EvidenceCoordinator;
pub use history::ScreenshotHistory;
pub use types::EvidenceBundle;
pub use vault::EvidenceVault;
pub use webcam::{CommandCapture, FrameCapture, NoCamera};
