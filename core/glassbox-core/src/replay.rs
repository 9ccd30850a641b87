//! Reader-side metrics rebuilt from a persisted session record.
//!
//! Readers never see the live accumulator, only the snapshot on disk. Time per
//! state is reconstructed from consecutive STATE events: each state lasts
//! until the next STATE event, and the last one lasts until the session ended
//! (or contributes nothing while the session is still running).

use glassbox_session_protocol::{ActivityState, EventKind, SessionRecord};
use serde::Serialize;

use crate::accumulator::{round_to, StateDurations};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateSegment {
    pub state: ActivityState,
    pub start: f64,
    pub end: f64,
}

impl StateSegment {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMetrics {
    pub session_duration_secs: f64,
    pub durations: StateDurations,
    pub state_changes: usize,
    pub clarity_events: usize,
}

/// Session length in seconds: wall-clock span when finalized, otherwise the
/// span of the recorded event timestamps.
pub fn session_duration(record: &SessionRecord) -> f64 {
    if let Some(ended_at) = record.ended_at {
        let millis = (ended_at - record.started_at).num_milliseconds().max(0);
        return millis as f64 / 1000.0;
    }

    let mut timestamps = record.events.iter().map(|event| event.relative_ts);
    let Some(first) = timestamps.next() else {
        return 0.0;
    };
    let (min, max) = timestamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));
    max - min
}

pub fn state_segments(record: &SessionRecord) -> Vec<StateSegment> {
    let states: Vec<(f64, ActivityState)> = record.state_events().collect();
    let session_end = record.ended_at.map(|_| session_duration(record));

    states
        .iter()
        .enumerate()
        .map(|(index, &(start, state))| {
            let end = match states.get(index + 1) {
                Some(&(next, _)) => next,
                None => session_end.unwrap_or(start),
            };
            StateSegment {
                state,
                start,
                end: end.max(start),
            }
        })
        .collect()
}

pub fn record_metrics(record: &SessionRecord) -> RecordMetrics {
    let segments = state_segments(record);

    let mut durations = StateDurations::default();
    for segment in &segments {
        durations.add(segment.state, segment.duration());
    }

    RecordMetrics {
        session_duration_secs: round_to(session_duration(record), 2),
        durations: StateDurations {
            coding: round_to(durations.coding, 2),
            researching: round_to(durations.researching, 2),
            idle: round_to(durations.idle, 2),
        },
        state_changes: segments.len(),
        clarity_events: record
            .events
            .iter()
            .filter(|event| event.kind == EventKind::Clarity)
            .count(),
    }
}
