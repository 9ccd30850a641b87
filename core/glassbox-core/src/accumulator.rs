//! Session-scoped activity statistics fed to the scoring engine.
//!
//! Both accumulators are interval-quantized: the sampler adds one polling
//! interval per tick, so precision is bounded by the interval.

use glassbox_session_protocol::ActivityState;
use serde::{Deserialize, Serialize};

/// Accumulated seconds per activity state. Values only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDurations {
    pub coding: f64,
    pub researching: f64,
    pub idle: f64,
}

impl StateDurations {
    pub fn get(&self, state: ActivityState) -> f64 {
        match state {
            ActivityState::Coding => self.coding,
            ActivityState::Researching => self.researching,
            ActivityState::Idle => self.idle,
        }
    }

    pub fn add(&mut self, state: ActivityState, secs: f64) {
        if !secs.is_finite() || secs <= 0.0 {
            return;
        }
        let slot = match state {
            ActivityState::Coding => &mut self.coding,
            ActivityState::Researching => &mut self.researching,
            ActivityState::Idle => &mut self.idle,
        };
        *slot += secs;
    }

    pub fn total(&self) -> f64 {
        self.coding + self.researching + self.idle
    }

    pub fn productive(&self) -> f64 {
        self.coding + self.researching
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityAccumulator {
    pub durations: StateDurations,
    /// Count of active → inactive keyboard transitions.
    pub inactive_periods: u32,
    pub total_inactive_secs: f64,
    last_inactive: bool,
}

/// Keyboard statistics as reported alongside a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardStats {
    pub inactive_periods: u32,
    pub total_inactive_time: f64,
    pub inactive_percentage: f64,
}

impl ActivityAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_durations(durations: StateDurations, total_inactive_secs: f64) -> Self {
        Self {
            durations,
            total_inactive_secs: total_inactive_secs.max(0.0),
            ..Self::default()
        }
    }

    pub fn record_tick(&mut self, state: ActivityState, interval_secs: f64) {
        self.durations.add(state, interval_secs);
    }

    /// Feeds the current keyboard inactivity flag for one tick.
    ///
    /// Returns true when this tick started a new inactive period.
    pub fn record_inactivity(&mut self, inactive: bool, interval_secs: f64) -> bool {
        let started = inactive && !self.last_inactive;
        if started {
            self.inactive_periods += 1;
        }
        if inactive && interval_secs.is_finite() && interval_secs > 0.0 {
            self.total_inactive_secs += interval_secs;
        }
        self.last_inactive = inactive;
        started
    }

    pub fn is_inactive(&self) -> bool {
        self.last_inactive
    }

    pub fn keyboard_stats(&self) -> KeyboardStats {
        let total = self.durations.total();
        let percentage = if total > 0.0 {
            self.total_inactive_secs / total * 100.0
        } else {
            0.0
        };
        KeyboardStats {
            inactive_periods: self.inactive_periods,
            total_inactive_time: round_to(self.total_inactive_secs, 2),
            inactive_percentage: round_to(percentage, 1),
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
