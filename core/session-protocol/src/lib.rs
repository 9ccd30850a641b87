//! Session record schema for GlassBox.
//!
//! This crate is shared by the session writer and every reader of the persisted
//! log (dashboard, certificate tooling) to prevent schema drift. The writer owns
//! mutation; readers only ever deserialize complete snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const RECORD_VERSION: u32 = 1;
pub const SESSION_LOG_FILE: &str = "session_log.json";
pub const STOP_SENTINEL_FILE: &str = "STOP_SESSION";

/// Classified activity at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityState {
    Coding,
    Researching,
    Idle,
}

impl ActivityState {
    pub const ALL: [ActivityState; 3] = [
        ActivityState::Coding,
        ActivityState::Researching,
        ActivityState::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Coding => "CODING",
            ActivityState::Researching => "RESEARCHING",
            ActivityState::Idle => "IDLE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == value)
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    #[default]
    Pending,
    Pass,
    Fail,
}

impl Verdict {
    /// PASS once the hard score reaches the threshold, FAIL otherwise.
    pub fn from_hard_score(hard_score: u32, pass_threshold: u32) -> Self {
        if hard_score >= pass_threshold {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, Verdict::Pending)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Pending => "PENDING",
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        };
        f.write_str(label)
    }
}

/// Event type tag. Persisted as a bare string so producers can introduce new
/// tags without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    State,
    Clarity,
    FinalAnalysis,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::State => "STATE",
            EventKind::Clarity => "CLARITY",
            EventKind::FinalAnalysis => "FINAL_ANALYSIS",
            EventKind::Other(tag) => tag.as_str(),
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "STATE" => EventKind::State,
            "CLARITY" => EventKind::Clarity,
            "FINAL_ANALYSIS" => EventKind::FinalAnalysis,
            _ => EventKind::Other(value),
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        EventKind::from(value.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped entry in the session log. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since `started_at`, two-decimal precision.
    #[serde(rename = "ts")]
    pub relative_ts: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub hard_score: u32,
    pub soft_score: u32,
    pub verdict: Verdict,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            hard_score: 0,
            soft_score: 0,
            verdict: Verdict::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub session_id: String,
    pub candidate_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub summary: Summary,
}

fn default_version() -> u32 {
    RECORD_VERSION
}

impl SessionRecord {
    pub fn new(session_id: String, candidate_id: String, started_at: DateTime<Utc>) -> Self {
        Self {
            version: RECORD_VERSION,
            session_id,
            candidate_id,
            started_at,
            ended_at: None,
            events: Vec::new(),
            summary: Summary::default(),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.ended_at.is_some()
    }

    /// True when event timestamps never go backwards.
    pub fn is_chronological(&self) -> bool {
        self.events
            .windows(2)
            .all(|pair| pair[0].relative_ts <= pair[1].relative_ts)
    }

    /// STATE events as `(ts, state)` pairs; entries with an unknown state are skipped.
    pub fn state_events(&self) -> impl Iterator<Item = (f64, ActivityState)> + '_ {
        self.events
            .iter()
            .filter(|event| event.kind == EventKind::State)
            .filter_map(|event| {
                let state = event.payload.get("state")?.as_str()?;
                ActivityState::parse(state).map(|state| (event.relative_ts, state))
            })
    }
}

pub fn parse_record(content: &str) -> Result<SessionRecord, serde_json::Error> {
    serde_json::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> SessionRecord {
        let started_at = DateTime::parse_from_rfc3339("2026-01-31T10:00:00Z")
            .expect("parse")
            .with_timezone(&Utc);
        let mut record = SessionRecord::new("01J0SESSION".to_string(), "dev_01".to_string(), started_at);
        record.events.push(Event {
            relative_ts: 0.0,
            kind: EventKind::State,
            payload: json!({ "state": "RESEARCHING" }),
        });
        record.events.push(Event {
            relative_ts: 4.5,
            kind: EventKind::State,
            payload: json!({ "state": "CODING" }),
        });
        record.events.push(Event {
            relative_ts: 9.25,
            kind: EventKind::Clarity,
            payload: json!({ "coherence": 85, "terminology": 90, "completeness": 60, "comment": "ok" }),
        });
        record
    }

    #[test]
    fn event_kind_serializes_as_plain_string() {
        let event = Event {
            relative_ts: 1.25,
            kind: EventKind::FinalAnalysis,
            payload: json!({}),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "FINAL_ANALYSIS");
        assert_eq!(value["ts"], 1.25);
    }

    #[test]
    fn unknown_event_kind_is_preserved() {
        let event: Event =
            serde_json::from_str(r#"{"ts":2.0,"type":"CODE_SUBMITTED","payload":{"lines":10}}"#)
                .expect("parse");
        assert_eq!(event.kind, EventKind::Other("CODE_SUBMITTED".to_string()));
        let back = serde_json::to_value(&event).expect("serialize");
        assert_eq!(back["type"], "CODE_SUBMITTED");
    }

    #[test]
    fn new_record_has_pending_summary() {
        let record = sample_record();
        assert_eq!(record.summary, Summary::default());
        assert_eq!(record.summary.verdict, Verdict::Pending);
        assert!(!record.is_finalized());
    }

    #[test]
    fn record_survives_json_round_trip() {
        let record = sample_record();
        let content = serde_json::to_string_pretty(&record).expect("serialize");
        assert_eq!(parse_record(&content).expect("parse"), record);
    }

    #[test]
    fn state_events_skip_non_state_entries() {
        let record = sample_record();
        let states: Vec<_> = record.state_events().collect();
        assert_eq!(
            states,
            vec![(0.0, ActivityState::Researching), (4.5, ActivityState::Coding)]
        );
    }

    #[test]
    fn is_chronological_detects_reordering() {
        let mut record = sample_record();
        assert!(record.is_chronological());
        record.events.swap(0, 2);
        assert!(!record.is_chronological());
    }

    #[test]
    fn verdict_threshold_is_inclusive() {
        assert_eq!(Verdict::from_hard_score(60, 60), Verdict::Pass);
        assert_eq!(Verdict::from_hard_score(59, 60), Verdict::Fail);
        assert!(!Verdict::Pending.is_final());
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let record = parse_record(
            r#"{"session_id":"s","candidate_id":"c","started_at":"2026-01-31T10:00:00Z"}"#,
        )
        .expect("parse");
        assert_eq!(record.version, RECORD_VERSION);
        assert!(record.events.is_empty());
        assert_eq!(record.summary.verdict, Verdict::Pending);
    }
}
