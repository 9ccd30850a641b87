//! Keyboard activity tracking.
//!
//! The input callback only ever overwrites a single slot: the time of the
//! most recent keystroke, stored as nanoseconds since the tracker's origin.
//! No queue is kept because only the latest keystroke matters.

use std::io::{self, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

pub const INACTIVITY_THRESHOLD: Duration = Duration::from_secs(7);

#[derive(Debug)]
pub struct KeyboardActivityTracker {
    origin: Instant,
    last_keystroke_ns: AtomicU64,
    threshold: Duration,
}

impl Default for KeyboardActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardActivityTracker {
    /// The tracker counts its own creation as the last keystroke.
    pub fn new() -> Self {
        Self::with_threshold(INACTIVITY_THRESHOLD)
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            origin: Instant::now(),
            last_keystroke_ns: AtomicU64::new(0),
            threshold,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Input callback: fires on every keypress.
    pub fn record_keystroke(&self) {
        self.record_keystroke_at(Instant::now());
    }

    pub fn record_keystroke_at(&self, at: Instant) {
        let ns = at.saturating_duration_since(self.origin).as_nanos() as u64;
        self.last_keystroke_ns.store(ns, Ordering::Relaxed);
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        let elapsed = Duration::from_nanos(self.last_keystroke_ns.load(Ordering::Relaxed));
        let last = self.origin + elapsed;
        now.saturating_duration_since(last)
    }

    pub fn is_inactive(&self) -> bool {
        self.is_inactive_at(Instant::now())
    }

    pub fn is_inactive_at(&self, now: Instant) -> bool {
        self.idle_for(now) > self.threshold
    }
}

/// Delivers one keystroke per byte read from standard input.
///
/// The reader thread is detached; it ends when stdin closes.
pub fn spawn_stdin_keystrokes(tracker: Arc<KeyboardActivityTracker>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        let mut buffer = [0u8; 64];
        loop {
            match handle.read(&mut buffer) {
                Ok(0) => {
                    debug!("Keystroke source closed");
                    return;
                }
                Ok(_) => tracker.record_keystroke(),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    debug!(error = %err, "Keystroke source failed");
                    return;
                }
            }
        }
    })
}
