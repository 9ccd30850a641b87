//! Integration tests for a full recording: concurrent producers, sampler
//! shutdown, finalization and reader-side reload.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glassbox_core::protocol::{ActivityState, EventKind, Verdict};
use glassbox_core::{
    hard_score, load_record, record_metrics, ActivityAccumulator, ActivitySampler,
    GlassboxConfig, KeyboardActivityTracker, ScriptedWindowInspector, Session, SessionInputs,
    SessionTelemetryLog, SnapshotStore, StateDurations,
};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_concurrent_producers_persist_a_consistent_record() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("session_log.json");
    let log = Arc::new(SessionTelemetryLog::create("dev_01", SnapshotStore::new(&path)).unwrap());

    let sampler = ActivitySampler::new(
        Arc::clone(&log),
        Arc::new(KeyboardActivityTracker::new()),
        Arc::new(ScriptedWindowInspector::new(vec![
            "main.py - vscode",
            "docs - Firefox",
            "vim",
            "",
        ])),
        Duration::from_millis(5),
    )
    .spawn();

    let producers: Vec<_> = (0..3)
        .map(|worker| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for i in 0..20 {
                    log.log_clarity(json!({ "worker": worker, "chunk": i }))
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    thread::sleep(Duration::from_millis(80));

    sampler.stop();
    let report = sampler
        .join(Duration::from_secs(2))
        .unwrap_or_else(|_| panic!("sampler did not stop"));
    assert_eq!(report.failed_appends, 0);

    log.finish(hard_score(&report.accumulator), 50, Verdict::Fail)
        .unwrap();

    let persisted = load_record(&path).unwrap();
    assert_eq!(persisted, log.snapshot());
    assert!(persisted.is_chronological());
    assert_eq!(
        persisted
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Clarity)
            .count(),
        60
    );

    let states: Vec<_> = persisted.state_events().map(|(_, s)| s).collect();
    assert_eq!(
        states,
        vec![
            ActivityState::Coding,
            ActivityState::Researching,
            ActivityState::Coding,
            ActivityState::Idle,
        ]
    );
}

#[test]
fn test_stop_is_observed_within_one_interval() {
    let log = Arc::new(SessionTelemetryLog::create("dev", SnapshotStore::in_memory()).unwrap());
    let interval = Duration::from_millis(50);
    let sampler = ActivitySampler::new(
        log,
        Arc::new(KeyboardActivityTracker::new()),
        Arc::new(ScriptedWindowInspector::new(vec!["vscode"])),
        interval,
    )
    .spawn();
    thread::sleep(Duration::from_millis(120));

    let stopped_at = Instant::now();
    sampler.stop();
    assert!(sampler.join(Duration::from_secs(2)).is_ok());
    assert!(stopped_at.elapsed() < interval * 4);
}

#[test]
fn test_accumulated_time_tracks_elapsed_time() {
    let log = Arc::new(SessionTelemetryLog::create("dev", SnapshotStore::in_memory()).unwrap());
    let interval = Duration::from_millis(20);
    // Oversleep of the OS timer accumulates once per tick.
    let scheduling_slack = Duration::from_millis(60);

    let started = Instant::now();
    let sampler = ActivitySampler::new(
        log,
        Arc::new(KeyboardActivityTracker::new()),
        Arc::new(ScriptedWindowInspector::new(vec!["vscode", "chrome", ""])),
        interval,
    )
    .spawn();
    thread::sleep(Duration::from_millis(300));
    sampler.stop();
    let elapsed = started.elapsed().as_secs_f64();

    let report = sampler
        .join(Duration::from_secs(2))
        .unwrap_or_else(|_| panic!("sampler did not stop"));
    let total = report.accumulator.durations.total();
    let interval_secs = interval.as_secs_f64();

    assert!(
        total <= elapsed + interval_secs + 1e-9,
        "accumulated {total}s exceeds elapsed {elapsed}s by more than one interval"
    );
    assert!(
        elapsed - total <= interval_secs + scheduling_slack.as_secs_f64(),
        "accumulated {total}s trails elapsed {elapsed}s by more than one interval"
    );
    assert!(report.accumulator.durations.idle > 0.0);
}

#[test]
fn test_session_record_replays_into_metrics() {
    let temp = tempdir().unwrap();
    let config = GlassboxConfig {
        sample_interval_secs: 0.02,
        join_timeout_secs: 2.0,
        data_dir: Some(temp.path().to_path_buf()),
        ..GlassboxConfig::default()
    };
    let path = config.session_log_path().unwrap();

    let mut session = Session::start(
        "hacker_007",
        config,
        Arc::new(ScriptedWindowInspector::new(vec!["vscode", "vscode", "chrome"])),
    )
    .unwrap();
    session
        .log()
        .log_final_analysis(json!({ "coherence": 70, "terminology": 80, "completeness": 90 }))
        .unwrap();
    thread::sleep(Duration::from_millis(100));
    let outcome = session.finish(SessionInputs::default()).unwrap();
    session.log().rename_candidate("Ada").unwrap();

    let record = load_record(&path).unwrap();
    assert_eq!(record.candidate_id, "Ada");
    assert_eq!(record.summary.hard_score, outcome.hard_score);
    assert!(record.summary.verdict.is_final());
    assert!(record.ended_at.is_some());

    let metrics = record_metrics(&record);
    assert_eq!(metrics.state_changes, 2);
    assert!(metrics.durations.researching > 0.0);
    assert!(metrics.session_duration_secs >= metrics.durations.total() - 0.01);
}

#[test]
fn test_scoring_reference_sessions() {
    let score = |coding, researching, idle| {
        hard_score(&ActivityAccumulator::with_durations(
            StateDurations {
                coding,
                researching,
                idle,
            },
            0.0,
        ))
    };

    assert_eq!(score(0.0, 0.0, 0.0), 0);
    assert_eq!(score(60.0, 0.0, 0.0), 90);
    assert_eq!(score(30.0, 10.0, 60.0), 60);
}
