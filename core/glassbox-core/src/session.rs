//! Session orchestration: wires the log, keyboard tracker and sampler
//! together for one recorded session and finalizes it with a verdict.

use std::sync::Arc;

use glassbox_session_protocol::Verdict;
use serde::Serialize;
use tracing::{info, warn};

use crate::accumulator::{ActivityAccumulator, KeyboardStats};
use crate::config::GlassboxConfig;
use crate::error::Result;
use crate::keyboard::KeyboardActivityTracker;
use crate::sampler::{ActivitySampler, SamplerHandle, SamplerReport};
use crate::scoring::{blend_code_score, score_breakdown, ScoreBreakdown};
use crate::telemetry::{SessionTelemetryLog, SnapshotStore};
use crate::window::WindowInspector;

/// Scores supplied by collaborators outside the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionInputs {
    pub soft_score: u32,
    /// External code-quality score; `None` or 0 means not assessed.
    pub code_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub session_id: String,
    pub time_score: u32,
    pub hard_score: u32,
    pub soft_score: u32,
    pub verdict: Verdict,
    pub breakdown: ScoreBreakdown,
    pub keyboard_stats: KeyboardStats,
    /// False when the sampler missed the join timeout and the statistics were
    /// read while it may still have been finishing a tick.
    pub sampler_joined: bool,
}

pub struct Session {
    config: GlassboxConfig,
    log: Arc<SessionTelemetryLog>,
    keyboard: Arc<KeyboardActivityTracker>,
    sampler: Option<SamplerHandle>,
    final_accumulator: Option<ActivityAccumulator>,
}

impl Session {
    /// Starts a session persisted at the configured session log path.
    pub fn start(
        candidate_id: impl Into<String>,
        config: GlassboxConfig,
        inspector: Arc<dyn WindowInspector>,
    ) -> Result<Self> {
        let store = SnapshotStore::new(&config.session_log_path()?);
        Self::start_with_store(candidate_id, config, inspector, store)
    }

    pub fn start_with_store(
        candidate_id: impl Into<String>,
        config: GlassboxConfig,
        inspector: Arc<dyn WindowInspector>,
        store: SnapshotStore,
    ) -> Result<Self> {
        let log = Arc::new(SessionTelemetryLog::create(candidate_id, store)?);
        let keyboard = Arc::new(KeyboardActivityTracker::with_threshold(
            config.inactivity_threshold(),
        ));
        let sampler = ActivitySampler::from_config(
            Arc::clone(&log),
            Arc::clone(&keyboard),
            inspector,
            &config,
        )
        .spawn();

        info!(session_id = %log.session_id(), "Session started");
        Ok(Self {
            config,
            log,
            keyboard,
            sampler: Some(sampler),
            final_accumulator: None,
        })
    }

    /// Shared log for additional producers such as the transcription feed.
    pub fn log(&self) -> Arc<SessionTelemetryLog> {
        Arc::clone(&self.log)
    }

    pub fn keyboard(&self) -> Arc<KeyboardActivityTracker> {
        Arc::clone(&self.keyboard)
    }

    pub fn accumulator(&self) -> ActivityAccumulator {
        match (&self.sampler, &self.final_accumulator) {
            (Some(handle), _) => handle.accumulator(),
            (None, Some(acc)) => acc.clone(),
            (None, None) => ActivityAccumulator::new(),
        }
    }

    /// Non-blocking stop signal for the sampler.
    pub fn stop(&self) {
        if let Some(handle) = &self.sampler {
            handle.stop();
        }
    }

    /// Stops and joins the sampler, scores the session and finalizes the log.
    pub fn finish(&mut self, inputs: SessionInputs) -> Result<SessionOutcome> {
        let joined = self.stop_sampler();
        let accumulator = self.accumulator();

        let breakdown = score_breakdown(&accumulator);
        let time_score = breakdown.final_score;
        let hard_score = blend_code_score(time_score, inputs.code_score);
        let verdict = Verdict::from_hard_score(hard_score, self.config.pass_threshold);

        self.log.finish(hard_score, inputs.soft_score, verdict)?;

        Ok(SessionOutcome {
            session_id: self.log.session_id(),
            time_score,
            hard_score,
            soft_score: inputs.soft_score,
            verdict,
            breakdown,
            keyboard_stats: accumulator.keyboard_stats(),
            sampler_joined: joined,
        })
    }

    fn stop_sampler(&mut self) -> bool {
        let Some(handle) = self.sampler.take() else {
            return true;
        };
        handle.stop();

        match handle.join(self.config.join_timeout()) {
            Ok(SamplerReport {
                accumulator,
                ticks,
                failed_appends,
                ..
            }) => {
                if failed_appends > 0 {
                    warn!(failed_appends, "Some state transitions were not persisted");
                }
                info!(ticks, "Sampler joined");
                self.final_accumulator = Some(accumulator);
                true
            }
            Err(handle) => {
                warn!(
                    timeout_ms = self.config.join_timeout().as_millis() as u64,
                    "Sampler did not stop in time; scoring best-effort statistics"
                );
                self.final_accumulator = Some(handle.accumulator());
                false
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
