//! The session telemetry log: single point of serialization for the record.
//!
//! All mutations take the same lock, compute their timestamp while holding
//! it, mutate the in-memory record and persist the full snapshot before
//! releasing. Events are therefore ordered by lock acquisition and their
//! relative timestamps never decrease.
//!
//! Once finalized the record only accepts a candidate rename; appends are
//! rejected with [`GlassboxError::AlreadyFinalized`].
//!
//! A failed persist leaves the in-memory record intact (the mutation stays
//! applied) and surfaces [`GlassboxError::Persist`]. The next successful
//! mutation, or an explicit [`SessionTelemetryLog::flush`], writes the
//! complete current state again.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use glassbox_session_protocol::{ActivityState, EventKind, Event, SessionRecord, Summary, Verdict};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::store::SnapshotStore;
use crate::accumulator::round_to;
use crate::error::{GlassboxError, Result};

struct LogState {
    record: SessionRecord,
    store: SnapshotStore,
}

impl LogState {
    fn persist(&self) -> Result<()> {
        self.store.save(&self.record)
    }
}

pub struct SessionTelemetryLog {
    state: Mutex<LogState>,
    clock: Instant,
}

impl SessionTelemetryLog {
    /// Starts a new session record and writes the initial snapshot.
    pub fn create(candidate_id: impl Into<String>, store: SnapshotStore) -> Result<Self> {
        let session_id = ulid::Ulid::new().to_string();
        let record = SessionRecord::new(session_id, candidate_id.into(), Utc::now());
        let clock = Instant::now();

        store.prepare()?;
        store.save(&record)?;
        info!(
            session_id = %record.session_id,
            candidate_id = %record.candidate_id,
            path = ?store.path(),
            "Session log created"
        );

        Ok(Self {
            state: Mutex::new(LogState { record, store }),
            clock,
        })
    }

    // Mutations are single pushes or field writes, so a panic in another
    // holder cannot leave the record half-updated.
    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_id(&self) -> String {
        self.lock().record.session_id.clone()
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.lock().store.path().map(|path| path.to_path_buf())
    }

    /// Appends an event and persists the record.
    ///
    /// A finalized record is read-only: the event is dropped and
    /// [`GlassboxError::AlreadyFinalized`] is returned.
    pub fn append(&self, kind: impl Into<EventKind>, payload: Value) -> Result<()> {
        let kind = kind.into();
        let mut state = self.lock();
        if state.record.is_finalized() {
            return Err(GlassboxError::AlreadyFinalized {
                session_id: state.record.session_id.clone(),
            });
        }
        let relative_ts = round_to(self.clock.elapsed().as_secs_f64(), 2);
        debug!(event_type = %kind, ts = relative_ts, "Appending session event");
        state.record.events.push(Event {
            relative_ts,
            kind,
            payload,
        });
        state.persist()
    }

    pub fn log_state(&self, activity: ActivityState) -> Result<()> {
        self.append(EventKind::State, json!({ "state": activity }))
    }

    pub fn log_clarity(&self, analysis: Value) -> Result<()> {
        self.append(EventKind::Clarity, analysis)
    }

    pub fn log_final_analysis(&self, analysis: Value) -> Result<()> {
        self.append(EventKind::FinalAnalysis, analysis)
    }

    /// Finalizes the session exactly once.
    ///
    /// A second call fails with [`GlassboxError::AlreadyFinalized`] and leaves
    /// the record untouched; a PENDING verdict is rejected.
    pub fn finish(&self, hard_score: u32, soft_score: u32, verdict: Verdict) -> Result<()> {
        if !verdict.is_final() {
            return Err(GlassboxError::PendingVerdict);
        }

        let mut state = self.lock();
        if state.record.is_finalized() {
            return Err(GlassboxError::AlreadyFinalized {
                session_id: state.record.session_id.clone(),
            });
        }

        state.record.ended_at = Some(Utc::now());
        state.record.summary = Summary {
            hard_score,
            soft_score,
            verdict,
        };
        info!(
            session_id = %state.record.session_id,
            hard_score,
            soft_score,
            verdict = %verdict,
            events = state.record.events.len(),
            "Session finalized"
        );
        state.persist()
    }

    pub fn rename_candidate(&self, new_id: impl Into<String>) -> Result<()> {
        let mut state = self.lock();
        state.record.candidate_id = new_id.into();
        info!(
            session_id = %state.record.session_id,
            candidate_id = %state.record.candidate_id,
            "Candidate renamed"
        );
        state.persist()
    }

    /// Re-persists the current record, e.g. after a transient write failure.
    pub fn flush(&self) -> Result<()> {
        self.lock().persist()
    }

    pub fn snapshot(&self) -> SessionRecord {
        self.lock().record.clone()
    }
}
