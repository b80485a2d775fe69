//! Risk Module - Temporal aggregation & alert decision
//!
//! # Components
//! - `window.rs`: Sliding window aggregator (ring buffer + weighted risk)
//! - `gate.rs`: Decision gate (threshold, min samples, cooldown)
//! - `types.rs`: Sample, RiskSnapshot, AlertState, Decision

pub mod gate;
pub mod types;
pub mod window;


pub use gate::DecisionGate;
pub use types::{AlertState, Decision, GatePhase, RiskSnapshot, Sample};
pub use window::SlidingWindowAggregator;
