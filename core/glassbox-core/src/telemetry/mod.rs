//! Session telemetry: the canonical record, its single writer and its
//! snapshot persistence.
//!
//! # Concurrency
//!
//! The sampler thread, the transcription producer and the orchestrator all
//! write through [`SessionTelemetryLog`]. Nothing else touches the record or
//! its file.
//!
//! # On-disk format
//!
//! ```json
//! {
//!   "version": 1,
//!   "session_id": "01J...",
//!   "candidate_id": "hacker_007",
//!   "started_at": "2026-01-31T10:00:00Z",
//!   "ended_at": null,
//!   "events": [ { "ts": 0.0, "type": "STATE", "payload": { "state": "CODING" } } ],
//!   "summary": { "hard_score": 0, "soft_score": 0, "verdict": "PENDING" }
//! }
//! ```

mod log;
mod store;

pub use log::SessionTelemetryLog;
pub use store::{load_record, SnapshotStore};

pub(crate) use store::{atomic_write, parent_dir};
