//! Crisis Detection Core
//!
//! Turns a stream of per-capture distress scores into at most one alert per
//! cooldown period, with preserved evidence and a durable alert record.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{AlertError, AlertResult, ConfigError, NotifyError, RiskError};
pub use logic::alert::{Alert, AlertManager, AlertStatus, AlertStore, Severity};
pub use logic::config::{AlertConfig, EvidenceConfig, MonitorConfig, NotificationMethod, RiskConfig};
pub use logic::evidence::{EvidenceBundle, EvidenceCoordinator, EvidenceVault};
pub use logic::monitor::{Monitor, ProducerHandle};
pub use logic::notify::NotificationSink;
pub use logic::risk::{DecisionGate, RiskSnapshot, SlidingWindowAggregator};
