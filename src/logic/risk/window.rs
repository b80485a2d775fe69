//! Sliding Window Aggregator
//!
//! Holds recent `(timestamp, score)` samples in a count-bounded ring buffer
//! and computes the recency- and frequency-weighted aggregate risk on demand.
//!
//! ## Aggregation
//! - Fewer than `min_samples` in the window: risk is exactly 0.0
//! - weight = sqrt(1 - age / window), clamped to [0, 1]
//! - base = weighted mean of scores
//! - risk = min(base * (1 + 0.3 * share of scores > 0.5), 1.0)

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::types::{RiskSnapshot, Sample};
use crate::error::RiskError;
use crate::logic::config::RiskConfig;

/// Scores strictly above this count as "high" for the frequency boost
pub const HIGH_SCORE_CUTOFF: f64 = 0.5;

/// Maximum boost applied when every in-window score is high
pub const FREQUENCY_BOOST: f64 = 0.3;

/// Thread-safe sample buffer. One writer (`add`) and one reader
/// (`snapshot`) may run concurrently; both hold the lock only briefly.
#[derive(Debug)]
pub struct SlidingWindowAggregator {
    buffer: Mutex<VecDeque<Sample>>,
    capacity: usize,
    window_secs: u64,
    min_samples: usize,
}

impl SlidingWindowAggregator {
    pub fn new(config: &RiskConfig) -> Self {
        let capacity = config.buffer_capacity.max(1);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            window_secs: config.window_secs,
            min_samples: config.min_samples,
        }
    }

    /// Record a score. Out-of-range (or NaN) scores are rejected, not clamped.
    pub fn add(&self, score: f64, timestamp: DateTime<Utc>) -> Result<(), RiskError> {
        if !(0.0..=1.0).contains(&score) {
            log::warn!("Rejected out-of-range distress score: {}", score);
            return Err(RiskError::InvalidScore { score });
        }

        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(Sample { timestamp, score });
        drop(buffer);

        log::debug!("Added score: {:.3} at {}", score, timestamp);
        Ok(())
    }

    /// Window statistics and aggregate risk as of `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> RiskSnapshot {
        let window_start = now - chrono::Duration::seconds(self.window_secs as i64);
        let in_window: Vec<Sample> = self
            .buffer
            .lock()
            .iter()
            .filter(|s| s.timestamp >= window_start)
            .copied()
            .collect();

        compute_snapshot(&in_window, now, self.window_secs, self.min_samples)
    }

    /// Shorthand for `snapshot(now).aggregate_risk`.
    pub fn aggregate_risk(&self, now: DateTime<Utc>) -> f64 {
        self.snapshot(now).aggregate_risk
    }

    /// Samples currently buffered (in or out of the window)
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }
}

/// Statistics over samples already filtered to the window.
pub fn compute_snapshot(
    samples: &[Sample],
    now: DateTime<Utc>,
    window_secs: u64,
    min_samples: usize,
) -> RiskSnapshot {
    let window_minutes = window_secs as f64 / 60.0;
    if samples.is_empty() {
        return RiskSnapshot::empty(window_minutes);
    }

    let count = samples.len();
    let sum: f64 = samples.iter().map(|s| s.score).sum();
    let max_score = samples.iter().map(|s| s.score).fold(f64::MIN, f64::max);
    let min_score = samples.iter().map(|s| s.score).fold(f64::MAX, f64::min);

    RiskSnapshot {
        sample_count: count,
        avg_score: sum / count as f64,
        max_score,
        min_score,
        aggregate_risk: aggregate_risk(samples, now, window_secs, min_samples),
        window_minutes,
    }
}

/// Weighted aggregate risk over in-window samples.
pub fn aggregate_risk(
    samples: &[Sample],
    now: DateTime<Utc>,
    window_secs: u64,
    min_samples: usize,
) -> f64 {
    if samples.len() < min_samples || samples.is_empty() {
        log::debug!("Insufficient samples: {}/{}", samples.len(), min_samples);
        return 0.0;
    }

    let window_seconds = window_secs as f64;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for sample in samples {
        let age_seconds = (now - sample.timestamp).num_milliseconds() as f64 / 1000.0;
        let recency = if window_seconds > 0.0 {
            (1.0 - age_seconds / window_seconds).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let weight = recency.sqrt();

        weighted_sum += sample.score * weight;
        total_weight += weight;
    }

    let base_risk = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };

    let high_count = samples.iter().filter(|s| s.score > HIGH_SCORE_CUTOFF).count();
    let frequency_ratio = high_count as f64 / samples.len() as f64;
    let frequency_multiplier = 1.0 + FREQUENCY_BOOST * frequency_ratio;

    let risk = (base_risk * frequency_multiplier).min(1.0);
    log::debug!(
        "Risk: {:.3} (base: {:.3}, freq: {:.2})",
        risk,
        base_risk,
        frequency_ratio
    );
    risk
}
