//! Persistent ranking of finished sessions.
//!
//! Stored as a JSON array next to the session log, sorted by total score
//! (mean of hard and soft) descending.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GlassboxError, Result};
use crate::telemetry::{atomic_write, parent_dir};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub recorded_at: DateTime<Utc>,
    pub hard_score: u32,
    pub soft_score: u32,
    pub total_score: f64,
    #[serde(default)]
    pub ai_overview: String,
}

#[derive(Debug)]
pub struct Leaderboard {
    path: PathBuf,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Loads the board. A missing file is an empty board; an unreadable or
    /// corrupt one is logged and replaced on the next save.
    pub fn load(path: &Path) -> Self {
        let entries = if path.exists() {
            match read_entries(path) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Could not load leaderboard, starting fresh"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut board = Self {
            path: path.to_path_buf(),
            entries,
        };
        board.sort();
        board
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Adds a ranked entry, saves the board and returns its 1-based rank.
    pub fn add_entry(
        &mut self,
        name: impl Into<String>,
        hard_score: u32,
        soft_score: u32,
        ai_overview: impl Into<String>,
    ) -> Result<usize> {
        let entry = LeaderboardEntry {
            name: name.into(),
            recorded_at: Utc::now(),
            hard_score,
            soft_score,
            total_score: f64::from(hard_score + soft_score) / 2.0,
            ai_overview: ai_overview.into(),
        };
        info!(name = %entry.name, total_score = entry.total_score, "Leaderboard entry added");

        self.entries.push(entry.clone());
        self.sort();
        self.save()?;

        let index = self
            .entries
            .iter()
            .rposition(|existing| *existing == entry)
            .unwrap_or(self.entries.len() - 1);
        Ok(index + 1)
    }

    pub fn save(&self) -> Result<()> {
        fs_err::create_dir_all(parent_dir(&self.path)).map_err(|err| GlassboxError::Io {
            context: "creating leaderboard directory".to_string(),
            source: err,
        })?;
        let content =
            serde_json::to_string_pretty(&self.entries).map_err(|err| GlassboxError::Json {
                context: "serializing leaderboard".to_string(),
                source: err,
            })?;
        atomic_write(&self.path, content.as_bytes()).map_err(|source| GlassboxError::Persist {
            path: self.path.clone(),
            source,
        })
    }

    // Stable sort keeps earlier entries ahead on ties.
    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    }
}

fn read_entries(path: &Path) -> Result<Vec<LeaderboardEntry>> {
    let content = fs_err::read_to_string(path).map_err(|err| GlassboxError::Io {
        context: "reading leaderboard".to_string(),
        source: err,
    })?;
    serde_json::from_str(&content).map_err(|err| GlassboxError::Json {
        context: format!("parsing leaderboard {}", path.display()),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty_board() {
        let temp = tempdir().unwrap();
        let board = Leaderboard::load(&temp.path().join("leaderboard.json"));
        assert!(board.entries().is_empty());
    }

    #[test]
    fn corrupt_file_is_empty_board() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("leaderboard.json");
        fs::write(&path, "[{\"name\": 3}").unwrap();
        assert!(Leaderboard::load(&path).entries().is_empty());
    }

    #[test]
    fn entries_sorted_by_total_and_persisted() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data").join("leaderboard.json");

        let mut board = Leaderboard::load(&path);
        assert_eq!(board.add_entry("Ada", 70, 80, "steady").unwrap(), 1);
        assert_eq!(board.add_entry("Linus", 90, 91, "fast").unwrap(), 1);
        assert_eq!(board.add_entry("Grace", 40, 45, "").unwrap(), 3);
        assert_eq!(board.entries()[1].total_score, 75.0);

        let names: Vec<_> = board.top(2).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Linus", "Ada"]);

        let reloaded = Leaderboard::load(&path);
        assert_eq!(reloaded.entries(), board.entries());
        assert_eq!(reloaded.entries()[2].name, "Grace");
    }

    #[test]
    fn top_larger_than_board_returns_all() {
        let temp = tempdir().unwrap();
        let mut board = Leaderboard::load(&temp.path().join("leaderboard.json"));
        board.add_entry("Solo", 61, 0, "").unwrap();
        assert_eq!(board.top(10).len(), 1);
        assert_eq!(board.top(10)[0].total_score, 30.5);
    }
}
