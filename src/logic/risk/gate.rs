//! Alert Decision Gate
//!
//! Wraps the aggregator with threshold, minimum-sample and cooldown logic.
//! Two phases: `ARMED` (may fire) and `COOLING` (inside the cooldown).
//! The only instant `evaluate` returns true is the ARMED -> COOLING
//! transition, which is also the only place `AlertState` changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::types::{AlertState, Decision, GatePhase, RiskSnapshot};
use super::window::SlidingWindowAggregator;
use crate::logic::config::RiskConfig;

pub struct DecisionGate {
    aggregator: Arc<SlidingWindowAggregator>,
    state: Mutex<AlertState>,
    threshold: f64,
    cooldown: chrono::Duration,
}

impl DecisionGate {
    pub fn new(config: &RiskConfig) -> Self {
        Self::with_aggregator(config, Arc::new(SlidingWindowAggregator::new(config)))
    }

    /// Gate over an aggregator the producer already holds.
    pub fn with_aggregator(config: &RiskConfig, aggregator: Arc<SlidingWindowAggregator>) -> Self {
        Self {
            aggregator,
            state: Mutex::new(AlertState::default()),
            threshold: config.alert_threshold,
            cooldown: config.cooldown(),
        }
    }

    /// Handle for the producer side.
    pub fn aggregator(&self) -> Arc<SlidingWindowAggregator> {
        Arc::clone(&self.aggregator)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True exactly when an alert should be raised at `now`.
    pub fn evaluate(&self, now: DateTime<Utc>) -> bool {
        self.evaluate_detailed(now).triggered
    }

    /// Evaluate and return the snapshot the decision was made on.
    ///
    /// The state lock is held across the cooldown check, the risk computation
    /// and the update, so concurrent callers can never both fire.
    pub fn evaluate_detailed(&self, now: DateTime<Utc>) -> Decision {
        let mut state = self.state.lock();
        let cooling = self.is_cooling(&state, now);

        // Computed even while cooling, for reporting.
        let snapshot = self.aggregator.snapshot(now);

        if cooling {
            log::debug!(
                "Alert cooldown active (last alert: {:?}), risk {:.3}",
                state.last_alert_time,
                snapshot.aggregate_risk
            );
            return Decision {
                evaluated_at: now,
                triggered: false,
                phase: GatePhase::Cooling,
                snapshot,
            };
        }

        if snapshot.aggregate_risk >= self.threshold {
            log::warn!(
                "ALERT THRESHOLD EXCEEDED: {:.3} >= {}",
                snapshot.aggregate_risk,
                self.threshold
            );
            state.last_alert_time = Some(now);
            state.alert_count += 1;
            let phase = self.phase_of(&state, now);
            return Decision {
                evaluated_at: now,
                triggered: true,
                phase,
                snapshot,
            };
        }

        Decision {
            evaluated_at: now,
            triggered: false,
            phase: GatePhase::Armed,
            snapshot,
        }
    }

    /// Read-only snapshot; never touches cooldown state.
    pub fn snapshot(&self, now: DateTime<Utc>) -> RiskSnapshot {
        self.aggregator.snapshot(now)
    }

    pub fn phase(&self, now: DateTime<Utc>) -> GatePhase {
        let state = self.state.lock();
        self.phase_of(&state, now)
    }

    pub fn alert_state(&self) -> AlertState {
        self.state.lock().clone()
    }

    fn phase_of(&self, state: &AlertState, now: DateTime<Utc>) -> GatePhase {
        if self.is_cooling(state, now) {
            GatePhase::Cooling
        } else {
            GatePhase::Armed
        }
    }

    fn is_cooling(&self, state: &AlertState, now: DateTime<Utc>) -> bool {
        match state.last_alert_time {
            Some(last) => now - last < self.cooldown,
            None => false,
        }
    }
}
