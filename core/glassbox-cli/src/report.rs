//! Read-only commands: `show`, `leaderboard`, `score`, plus `stop`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use glassbox_core::protocol::SessionRecord;
use glassbox_core::{
    load_record, record_metrics, score_breakdown, ActivityAccumulator, GlassboxConfig,
    Leaderboard, LeaderboardEntry, StateDurations,
};
use tracing::info;

/// Writes the stop sentinel that a running `glassbox run` polls for.
pub fn stop(config: &GlassboxConfig) -> Result<(), String> {
    let sentinel = config.stop_sentinel_path()?;
    if let Some(parent) = sentinel.parent() {
        fs_err::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    fs_err::write(&sentinel, Utc::now().to_rfc3339()).map_err(|err| err.to_string())?;
    info!(sentinel = %sentinel.display(), "Stop sentinel written");
    println!("Stop requested ({})", sentinel.display());
    Ok(())
}

pub fn show(config: &GlassboxConfig, path: Option<PathBuf>, json: bool) -> Result<(), String> {
    let path = match path {
        Some(path) => path,
        None => config.session_log_path()?,
    };
    let record = load_record(&path)?;
    if json {
        let metrics = record_metrics(&record);
        let value = serde_json::json!({ "record": record, "metrics": metrics });
        let text = serde_json::to_string_pretty(&value).map_err(|err| err.to_string())?;
        println!("{text}");
    } else {
        print!("{}", format_record(&record, &path));
    }
    Ok(())
}

pub fn format_record(record: &SessionRecord, path: &Path) -> String {
    let metrics = record_metrics(record);
    let durations = &metrics.durations;
    let ended = record
        .ended_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "running".to_string());

    let mut out = String::new();
    out.push_str(&format!("{}\n", path.display()));
    out.push_str(&format!("  session      {}\n", record.session_id));
    out.push_str(&format!("  candidate    {}\n", record.candidate_id));
    out.push_str(&format!("  started      {}\n", record.started_at.to_rfc3339()));
    out.push_str(&format!("  ended        {}\n", ended));
    out.push_str(&format!(
        "  duration     {:.1}s (coding {:.1}s, researching {:.1}s, idle {:.1}s)\n",
        metrics.session_duration_secs, durations.coding, durations.researching, durations.idle,
    ));
    out.push_str(&format!(
        "  events       {} ({} state changes, {} clarity)\n",
        record.events.len(),
        metrics.state_changes,
        metrics.clarity_events,
    ));
    out.push_str(&format!(
        "  summary      hard {} / soft {} / {}\n",
        record.summary.hard_score, record.summary.soft_score, record.summary.verdict,
    ));
    out
}

pub fn leaderboard(config: &GlassboxConfig, top: usize) -> Result<(), String> {
    let board = Leaderboard::load(&config.leaderboard_path()?);
    print!("{}", format_leaderboard(board.top(top)));
    Ok(())
}

pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let rule = "=".repeat(60);
    let mut out = format!("{rule}\n");
    out.push_str(&format!(
        "{:<5} | {:<20} | {:<5} | {:<5} | {:<5}\n",
        "RANK", "NAME", "HARD", "SOFT", "TOTAL"
    ));
    out.push_str(&format!("{}\n", "-".repeat(60)));
    for (index, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:<5} | {:<20} | {:<5} | {:<5} | {:<5.1}\n",
            index + 1,
            entry.name,
            entry.hard_score,
            entry.soft_score,
            entry.total_score,
        ));
    }
    out.push_str(&format!("{rule}\n"));
    out
}

/// Scores offline durations (seconds) without recording a session.
pub fn score(coding: f64, researching: f64, idle: f64, inactive: f64) -> String {
    let acc = ActivityAccumulator::with_durations(
        StateDurations {
            coding: coding.max(0.0),
            researching: researching.max(0.0),
            idle: idle.max(0.0),
        },
        inactive,
    );
    let b = score_breakdown(&acc);
    format!(
        "productivity {:>6.1}  (ratio {:.2})\n\
         balance      {:>6.1}  (coding share {:.2})\n\
         idle penalty {:>6.1}\n\
         pacing       {:>6.1}\n\
         hard score   {:>6}\n",
        b.productivity_score,
        b.productivity_ratio,
        b.balance_score,
        b.coding_ratio,
        b.idle_penalty,
        b.inactivity_adjustment,
        b.final_score,
    )
}
