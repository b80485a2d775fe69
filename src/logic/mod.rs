//! Logic Module - Risk aggregation & alert lifecycle
//!
//! - `risk/` - Sliding window aggregator + decision gate
//! - `evidence/` - Screenshot/webcam evidence collection and preservation
//! - `alert/` - Alert records, durable store, lifecycle manager
//! - `notify/` - Notification sinks (log, file, email, webhook)
//! - `monitor` - Producer handle + periodic consumer loop

pub mod alert;
pub mod config;
pub mod evidence;
pub mod monitor;
pub mod notify;
pub mod risk;
