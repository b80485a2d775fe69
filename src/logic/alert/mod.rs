//! Alert Module - Alert lifecycle
//!
//! # Components
//! - `manager.rs`: Id allocation, severity, persistence, fan-out, status API
//! - `store.rs`: Atomic one-file-per-alert JSON persistence
//! - `types.rs`: Alert, Severity, AlertStatus, MachineInfo

pub mod manager;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub use manager::{AlertManager, AlertStats};
pub use store::AlertStore;
pub use types::{Alert, AlertStatus, MachineInfo, Severity};
