//! # glassbox-core
//!
//! Core library for GlassBox: records a work session as an append-only
//! telemetry log and derives a bounded 0–100 hard score from it.
//!
//! ## Design Principles
//!
//! - **Single writer**: every mutation of the session record goes through
//!   [`SessionTelemetryLog`], which serializes producers behind one lock.
//! - **Always a complete snapshot**: each mutation rewrites the whole record
//!   atomically, so readers never see a torn file.
//! - **Graceful degradation**: a missing window tool yields a placeholder
//!   title and a failed sampler tick is logged, not fatal.
//! - **Synchronous**: OS threads only, no async runtime.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use glassbox_core::{load_config, CommandWindowInspector, Session, SessionInputs};
//!
//! let config = load_config(None)?;
//! let mut session = Session::start("hacker_007", config, Arc::new(CommandWindowInspector::new()))?;
//! // ... work ...
//! let outcome = session.finish(SessionInputs::default())?;
//! println!("{} ({})", outcome.hard_score, outcome.verdict);
//! ```

pub mod accumulator;
pub mod analysis;
pub mod classify;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod leaderboard;
pub mod replay;
pub mod sampler;
pub mod scoring;
pub mod session;
pub mod telemetry;
pub mod window;

pub use accumulator::{ActivityAccumulator, KeyboardStats, StateDurations};
pub use analysis::{soft_score, ClarityReport};
pub use classify::{classify, KeywordClassifier};
pub use config::*;
pub use error::{GlassboxError, Result};
pub use keyboard::{spawn_stdin_keystrokes, KeyboardActivityTracker, INACTIVITY_THRESHOLD};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use replay::{record_metrics, RecordMetrics};
pub use sampler::{ActivitySampler, SamplerHandle, SamplerReport, TickOutcome};
pub use scoring::{blend_code_score, hard_score, score_breakdown, ScoreBreakdown};
pub use session::{Session, SessionInputs, SessionOutcome};
pub use telemetry::{load_record, SessionTelemetryLog, SnapshotStore};
pub use window::{
    CommandWindowInspector, FixedWindowInspector, ScriptedWindowInspector, WindowInspector,
};

pub use glassbox_session_protocol as protocol;
