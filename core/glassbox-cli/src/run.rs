//! `glassbox run`: records a live session until the stop sentinel appears.
//!
//! Flow:
//! 1. Clear any stale sentinel and start the session (sampler + stdin keystrokes)
//! 2. Poll for the sentinel once per sampling interval
//! 3. Attach the final analysis, if any, and derive the soft score from it
//! 4. Finalize with the blended hard score and verdict
//! 5. Optionally rank the candidate on the leaderboard and rename the record

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glassbox_core::{
    soft_score, spawn_stdin_keystrokes, ClarityReport, CommandWindowInspector, GlassboxConfig,
    Leaderboard, Session, SessionInputs, SessionOutcome,
};
use serde_json::Value;
use tracing::{info, warn};

const NO_ANALYSIS_OVERVIEW: &str = "No analysis available";

pub struct RunOptions {
    pub candidate: String,
    pub analysis: Option<PathBuf>,
    pub code_score: Option<u32>,
    pub name: Option<String>,
}

pub fn run(config: GlassboxConfig, options: RunOptions) -> Result<(), String> {
    let sentinel = config.stop_sentinel_path()?;
    clear_sentinel(&sentinel)?;
    let poll_interval = config.sample_interval();
    let leaderboard_path = config.leaderboard_path()?;

    let mut session = Session::start(
        options.candidate.as_str(),
        config,
        Arc::new(CommandWindowInspector::new()),
    )?;
    spawn_stdin_keystrokes(session.keyboard());

    let log = session.log();
    println!("Recording session {}", log.session_id());
    if let Some(path) = log.path() {
        println!("Session log: {}", path.display());
    }
    println!("Run `glassbox stop` to end the session.");

    wait_for_sentinel(&sentinel, poll_interval);
    info!(sentinel = %sentinel.display(), "Stop signal received");
    session.stop();
    clear_sentinel(&sentinel)?;

    let report = match &options.analysis {
        Some(path) => {
            let analysis = read_analysis(path)?;
            log.log_final_analysis(analysis.clone())?;
            Some(ClarityReport::from_value(&analysis))
        }
        None => None,
    };
    let soft = report.as_ref().map(soft_score).unwrap_or(0);

    let outcome = session.finish(SessionInputs {
        soft_score: soft,
        code_score: options.code_score,
    })?;
    print!("{}", format_outcome(&outcome));

    if let Some(name) = options.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let overview = leaderboard_overview(report.as_ref());
        let mut board = Leaderboard::load(&leaderboard_path);
        let rank = board.add_entry(name, outcome.hard_score, outcome.soft_score, overview)?;
        log.rename_candidate(name)?;
        println!("Leaderboard: {} ranked #{}", name, rank);
    }

    Ok(())
}

/// Blocks until `sentinel` exists, checking once per `poll_interval`.
pub fn wait_for_sentinel(sentinel: &Path, poll_interval: Duration) {
    while !sentinel.exists() {
        thread::sleep(poll_interval);
    }
}

fn clear_sentinel(sentinel: &Path) -> Result<(), String> {
    if !sentinel.exists() {
        return Ok(());
    }
    fs_err::remove_file(sentinel).map_err(|err| {
        warn!(error = %err, "Failed to remove stop sentinel");
        err.to_string()
    })
}

fn leaderboard_overview(report: Option<&ClarityReport>) -> String {
    report
        .map(|report| report.comment.trim())
        .filter(|comment| !comment.is_empty())
        .unwrap_or(NO_ANALYSIS_OVERVIEW)
        .to_string()
}

fn read_analysis(path: &Path) -> Result<Value, String> {
    let content = fs_err::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&content)
        .map_err(|err| format!("Analysis file {} is not JSON: {}", path.display(), err))
}

pub fn format_outcome(outcome: &SessionOutcome) -> String {
    let breakdown = &outcome.breakdown;
    let stats = &outcome.keyboard_stats;
    let mut out = String::new();
    out.push_str(&format!("Session {} finalized\n", outcome.session_id));
    out.push_str(&format!(
        "  time score   {:>3}  (productivity {:.1}, balance {:.0}, idle {:.0}, pacing {:+.0})\n",
        outcome.time_score,
        breakdown.productivity_score,
        breakdown.balance_score,
        breakdown.idle_penalty,
        breakdown.inactivity_adjustment,
    ));
    out.push_str(&format!("  hard score   {:>3}\n", outcome.hard_score));
    out.push_str(&format!("  soft score   {:>3}\n", outcome.soft_score));
    out.push_str(&format!("  verdict      {}\n", outcome.verdict));
    out.push_str(&format!(
        "  keyboard     {} inactive periods, {:.2}s inactive ({:.1}%)\n",
        stats.inactive_periods, stats.total_inactive_time, stats.inactive_percentage,
    ));
    if !outcome.sampler_joined {
        out.push_str("  note         sampler was still finishing a tick\n");
    }
    out
}
