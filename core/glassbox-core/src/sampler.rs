//! Fixed-interval activity sampler.
//!
//! Each tick reads the foreground window title, classifies it, appends a
//! STATE event when the classification changed, adds one interval to the
//! current state's duration and feeds the keyboard inactivity flag to the
//! accumulator.
//!
//! ## Lifecycle
//!
//! 1. [`ActivitySampler::spawn`] moves the sampler onto its own thread
//! 2. [`SamplerHandle::stop`] clears the running flag (non-blocking)
//! 3. The loop notices at the top of its next iteration, at most one interval later
//! 4. [`SamplerHandle::join`] waits with a timeout, since the loop may be mid-sleep

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glassbox_session_protocol::ActivityState;
use tracing::{debug, info, warn};

use crate::accumulator::ActivityAccumulator;
use crate::classify::KeywordClassifier;
use crate::config::GlassboxConfig;
use crate::error::GlassboxError;
use crate::keyboard::KeyboardActivityTracker;
use crate::telemetry::SessionTelemetryLog;
use crate::window::WindowInspector;

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

type SharedAccumulator = Arc<Mutex<ActivityAccumulator>>;

fn lock_accumulator(acc: &SharedAccumulator) -> MutexGuard<'_, ActivityAccumulator> {
    acc.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub state: ActivityState,
    pub transitioned: bool,
    pub inactive: bool,
}

/// Final statistics handed back when the sampler thread exits.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerReport {
    pub accumulator: ActivityAccumulator,
    pub ticks: u64,
    pub transitions: u64,
    pub failed_appends: u64,
}

pub struct ActivitySampler {
    log: Arc<SessionTelemetryLog>,
    keyboard: Arc<KeyboardActivityTracker>,
    inspector: Arc<dyn WindowInspector>,
    classifier: KeywordClassifier,
    interval: Duration,
    last_state: Option<ActivityState>,
    accumulator: SharedAccumulator,
    ticks: u64,
    transitions: u64,
    failed_appends: u64,
}

impl ActivitySampler {
    pub fn new(
        log: Arc<SessionTelemetryLog>,
        keyboard: Arc<KeyboardActivityTracker>,
        inspector: Arc<dyn WindowInspector>,
        interval: Duration,
    ) -> Self {
        Self {
            log,
            keyboard,
            inspector,
            classifier: KeywordClassifier::default(),
            interval,
            last_state: None,
            accumulator: Arc::new(Mutex::new(ActivityAccumulator::new())),
            ticks: 0,
            transitions: 0,
            failed_appends: 0,
        }
    }

    /// Sampler using the configured interval and keyword lists.
    pub fn from_config(
        log: Arc<SessionTelemetryLog>,
        keyboard: Arc<KeyboardActivityTracker>,
        inspector: Arc<dyn WindowInspector>,
        config: &GlassboxConfig,
    ) -> Self {
        let classifier =
            KeywordClassifier::new(config.coding_keywords(), config.researching_keywords());
        Self::new(log, keyboard, inspector, config.sample_interval()).with_classifier(classifier)
    }

    pub fn with_classifier(mut self, classifier: KeywordClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn accumulator(&self) -> ActivityAccumulator {
        lock_accumulator(&self.accumulator).clone()
    }

    /// Runs one sampling iteration on the calling thread.
    ///
    /// A failed STATE append is logged and counted; the tick still completes.
    pub fn tick(&mut self) -> TickOutcome {
        let title = self.inspector.active_window_title();
        let state = self.classifier.classify(&title);
        let interval_secs = self.interval.as_secs_f64();

        let transitioned = self.last_state != Some(state);
        if transitioned {
            match self.log.log_state(state) {
                Ok(()) => {}
                // The session ended while this tick was in flight.
                Err(GlassboxError::AlreadyFinalized { .. }) => {
                    debug!(state = %state, "Session finalized; state transition not recorded");
                }
                Err(err) => {
                    self.failed_appends += 1;
                    warn!(
                        error = %err,
                        state = %state,
                        failed_appends = self.failed_appends,
                        "Failed to persist state transition"
                    );
                }
            }
            info!(
                from = ?self.last_state,
                to = %state,
                title = %truncate_title(&title),
                "Activity state changed"
            );
            self.transitions += 1;
            self.last_state = Some(state);
        }

        let inactive = self.keyboard.is_inactive();
        {
            let mut acc = lock_accumulator(&self.accumulator);
            acc.record_tick(state, interval_secs);
            if acc.record_inactivity(inactive, interval_secs) {
                debug!(
                    inactive_periods = acc.inactive_periods,
                    threshold_secs = self.keyboard.threshold().as_secs_f64(),
                    "Keyboard inactive"
                );
            }
        }

        self.ticks += 1;
        TickOutcome {
            state,
            transitioned,
            inactive,
        }
    }

    pub fn spawn(self) -> SamplerHandle {
        let running = Arc::new(AtomicBool::new(true));
        let accumulator = Arc::clone(&self.accumulator);
        let flag = Arc::clone(&running);
        let thread = thread::spawn(move || self.run(&flag));
        SamplerHandle {
            running,
            accumulator,
            thread,
        }
    }

    fn run(mut self, running: &AtomicBool) -> SamplerReport {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Activity sampler started"
        );
        while running.load(Ordering::Acquire) {
            self.tick();
            thread::sleep(self.interval);
        }
        info!(
            ticks = self.ticks,
            transitions = self.transitions,
            failed_appends = self.failed_appends,
            "Activity sampler stopped"
        );
        self.report()
    }

    fn report(&self) -> SamplerReport {
        SamplerReport {
            accumulator: self.accumulator(),
            ticks: self.ticks,
            transitions: self.transitions,
            failed_appends: self.failed_appends,
        }
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(50).collect()
}

pub struct SamplerHandle {
    running: Arc<AtomicBool>,
    accumulator: SharedAccumulator,
    thread: JoinHandle<SamplerReport>,
}

impl SamplerHandle {
    /// Signals the loop to exit; safe to call from any thread, any number of times.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Live copy of the accumulator.
    pub fn accumulator(&self) -> ActivityAccumulator {
        lock_accumulator(&self.accumulator).clone()
    }

    /// Waits up to `timeout` for the loop to exit.
    ///
    /// On timeout the handle is returned so the caller can fall back to a
    /// best-effort [`SamplerHandle::accumulator`] read or wait again.
    pub fn join(self, timeout: Duration) -> Result<SamplerReport, SamplerHandle> {
        let deadline = Instant::now() + timeout;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                return Err(self);
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        let accumulator = Arc::clone(&self.accumulator);
        match self.thread.join() {
            Ok(report) => Ok(report),
            Err(_) => {
                warn!("Activity sampler thread panicked; using last accumulator");
                Ok(SamplerReport {
                    accumulator: lock_accumulator(&accumulator).clone(),
                    ticks: 0,
                    transitions: 0,
                    failed_appends: 0,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::SnapshotStore;
    use crate::window::{FixedWindowInspector, ScriptedWindowInspector};
    use glassbox_session_protocol::EventKind;

    fn sampler_with(titles: Vec<&str>) -> (Arc<SessionTelemetryLog>, ActivitySampler) {
        let log = Arc::new(
            SessionTelemetryLog::create("dev_01", SnapshotStore::in_memory()).unwrap(),
        );
        let sampler = ActivitySampler::new(
            Arc::clone(&log),
            Arc::new(KeyboardActivityTracker::new()),
            Arc::new(ScriptedWindowInspector::new(titles)),
            Duration::from_secs(1),
        );
        (log, sampler)
    }

    #[test]
    fn tick_appends_only_on_classification_change() {
        let (log, mut sampler) = sampler_with(vec![
            "main.py - vscode",
            "lib.rs - vim",
            "Google Chrome",
            "Google Chrome",
            "",
        ]);

        let transitions: Vec<bool> = (0..5).map(|_| sampler.tick().transitioned).collect();
        assert_eq!(transitions, vec![true, false, true, false, true]);

        let states: Vec<_> = log.snapshot().state_events().map(|(_, s)| s).collect();
        assert_eq!(
            states,
            vec![
                ActivityState::Coding,
                ActivityState::Researching,
                ActivityState::Idle
            ]
        );
    }

    #[test]
    fn every_tick_accumulates_one_interval() {
        let (_log, mut sampler) = sampler_with(vec!["vscode", "vscode", "chrome", "nothing"]);
        for _ in 0..4 {
            sampler.tick();
        }

        let acc = sampler.accumulator();
        assert_eq!(acc.durations.coding, 2.0);
        assert_eq!(acc.durations.researching, 1.0);
        assert_eq!(acc.durations.idle, 1.0);
        assert_eq!(acc.durations.total(), 4.0);
    }

    #[test]
    fn tick_feeds_keyboard_inactivity() {
        let log = Arc::new(
            SessionTelemetryLog::create("dev_01", SnapshotStore::in_memory()).unwrap(),
        );
        let keyboard = Arc::new(KeyboardActivityTracker::with_threshold(Duration::ZERO));
        thread::sleep(Duration::from_millis(5));
        let mut sampler = ActivitySampler::new(
            log,
            Arc::clone(&keyboard),
            Arc::new(FixedWindowInspector::new("vim")),
            Duration::from_secs(1),
        );

        assert!(sampler.tick().inactive);
        assert!(sampler.tick().inactive);
        let acc = sampler.accumulator();
        assert_eq!(acc.inactive_periods, 1);
        assert_eq!(acc.total_inactive_secs, 2.0);
    }

    #[test]
    fn failed_append_is_counted_and_tick_completes() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("data");
        let log = Arc::new(
            SessionTelemetryLog::create("dev_01", SnapshotStore::new(&dir.join("log.json")))
                .unwrap(),
        );
        std::fs::remove_dir_all(&dir).unwrap();

        let mut sampler = ActivitySampler::new(
            Arc::clone(&log),
            Arc::new(KeyboardActivityTracker::new()),
            Arc::new(FixedWindowInspector::new("vscode")),
            Duration::from_secs(1),
        );
        let outcome = sampler.tick();

        assert!(outcome.transitioned);
        assert_eq!(sampler.failed_appends, 1);
        assert_eq!(sampler.accumulator().durations.coding, 1.0);
        assert_eq!(log.snapshot().events[0].kind, EventKind::State);
    }

    #[test]
    fn tick_after_finalize_is_not_a_failed_append() {
        let (log, mut sampler) = sampler_with(vec!["vscode", "chrome"]);
        sampler.tick();
        log.finish(90, 0, glassbox_session_protocol::Verdict::Pass)
            .unwrap();

        let outcome = sampler.tick();
        assert!(outcome.transitioned);
        assert_eq!(sampler.failed_appends, 0);
        assert_eq!(log.snapshot().events.len(), 1);
        assert_eq!(sampler.accumulator().durations.researching, 1.0);
    }

    #[test]
    fn from_config_uses_configured_keywords() {
        let config = GlassboxConfig {
            coding_keywords: Some(vec!["Emacs".to_string()]),
            ..GlassboxConfig::default()
        };
        let log = Arc::new(
            SessionTelemetryLog::create("dev_01", SnapshotStore::in_memory()).unwrap(),
        );
        let mut sampler = ActivitySampler::from_config(
            log,
            Arc::new(KeyboardActivityTracker::new()),
            Arc::new(FixedWindowInspector::new("init.el - emacs")),
            &config,
        );
        assert_eq!(sampler.tick().state, ActivityState::Coding);
    }

    #[test]
    fn stop_ends_loop_within_an_interval() {
        let (_log, sampler) = sampler_with(vec!["vscode"]);
        let sampler = ActivitySampler {
            interval: Duration::from_millis(20),
            ..sampler
        };
        let handle = sampler.spawn();
        thread::sleep(Duration::from_millis(70));
        assert!(handle.is_running());

        handle.stop();
        let report = handle
            .join(Duration::from_secs(2))
            .unwrap_or_else(|_| panic!("sampler did not stop"));
        assert!(report.ticks >= 1);
        assert_eq!(report.transitions, 1);
        assert!(report.accumulator.durations.coding > 0.0);
    }

    #[test]
    fn join_times_out_while_loop_is_running() {
        let (_log, sampler) = sampler_with(vec!["vscode"]);
        let sampler = ActivitySampler {
            interval: Duration::from_millis(10),
            ..sampler
        };
        let handle = sampler.spawn();

        let handle = match handle.join(Duration::from_millis(30)) {
            Ok(_) => panic!("join should time out while running"),
            Err(handle) => handle,
        };
        assert!(handle.accumulator().durations.coding > 0.0);

        handle.stop();
        assert!(handle.join(Duration::from_secs(2)).is_ok());
    }
}
