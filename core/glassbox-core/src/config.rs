//! Configuration loading and well-known paths.
//!
//! Handles:
//! - Runtime tuning (`~/.glassbox/config.toml`)
//! - Locations of the session log, stop sentinel, leaderboard and log files

use std::path::{Path, PathBuf};
use std::time::Duration;

use glassbox_session_protocol::{SESSION_LOG_FILE, STOP_SENTINEL_FILE};
use serde::Deserialize;

use crate::classify::{CODING_KEYWORDS, RESEARCHING_KEYWORDS};
use crate::error::{GlassboxError, Result};

const CONFIG_RELATIVE_PATH: &str = ".glassbox/config.toml";
const LEADERBOARD_FILE: &str = "leaderboard.json";

pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 1.0;
pub const DEFAULT_INACTIVITY_THRESHOLD_SECS: f64 = 7.0;
pub const DEFAULT_JOIN_TIMEOUT_SECS: f64 = 1.0;
pub const DEFAULT_PASS_THRESHOLD: u32 = 60;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlassboxConfig {
    pub sample_interval_secs: f64,
    pub inactivity_threshold_secs: f64,
    pub join_timeout_secs: f64,
    pub pass_threshold: u32,
    pub data_dir: Option<PathBuf>,
    pub coding_keywords: Option<Vec<String>>,
    pub researching_keywords: Option<Vec<String>>,
}

impl Default for GlassboxConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            inactivity_threshold_secs: DEFAULT_INACTIVITY_THRESHOLD_SECS,
            join_timeout_secs: DEFAULT_JOIN_TIMEOUT_SECS,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            data_dir: None,
            coding_keywords: None,
            researching_keywords: None,
        }
    }
}

impl GlassboxConfig {
    pub fn sample_interval(&self) -> Duration {
        positive_secs(self.sample_interval_secs, DEFAULT_SAMPLE_INTERVAL_SECS)
    }

    pub fn inactivity_threshold(&self) -> Duration {
        positive_secs(
            self.inactivity_threshold_secs,
            DEFAULT_INACTIVITY_THRESHOLD_SECS,
        )
    }

    pub fn join_timeout(&self) -> Duration {
        positive_secs(self.join_timeout_secs, DEFAULT_JOIN_TIMEOUT_SECS)
    }

    pub fn coding_keywords(&self) -> Vec<String> {
        keywords_or_default(self.coding_keywords.as_deref(), CODING_KEYWORDS)
    }

    pub fn researching_keywords(&self) -> Vec<String> {
        keywords_or_default(self.researching_keywords.as_deref(), RESEARCHING_KEYWORDS)
    }

    /// Directory holding the session log, sentinel and leaderboard.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_glassbox_dir()?.join("data")),
        }
    }

    pub fn session_log_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(SESSION_LOG_FILE))
    }

    pub fn stop_sentinel_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(STOP_SENTINEL_FILE))
    }

    pub fn leaderboard_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(LEADERBOARD_FILE))
    }
}

/// Out-of-range values (non-positive, non-finite or too large for a
/// `Duration`) fall back to `default`.
fn positive_secs(value: f64, default: f64) -> Duration {
    Duration::try_from_secs_f64(value)
        .ok()
        .filter(|duration| !duration.is_zero())
        .unwrap_or_else(|| Duration::from_secs_f64(default))
}

fn keywords_or_default(configured: Option<&[String]>, default: &[&str]) -> Vec<String> {
    match configured {
        Some(words) if !words.is_empty() => words.iter().map(|w| w.to_lowercase()).collect(),
        _ => default.iter().map(|w| w.to_string()).collect(),
    }
}

/// Returns the GlassBox home directory (~/.glassbox).
pub fn get_glassbox_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".glassbox"))
        .ok_or(GlassboxError::HomeDirNotFound)
}

pub fn get_log_dir() -> Result<PathBuf> {
    Ok(get_glassbox_dir()?.join("logs"))
}

fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(GlassboxError::HomeDirNotFound)?;
    Ok(home.join(CONFIG_RELATIVE_PATH))
}

/// Loads the runtime configuration, returning defaults if the file doesn't exist.
pub fn load_config(path: Option<PathBuf>) -> Result<GlassboxConfig> {
    let config_path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };

    if !config_path.exists() {
        return Ok(GlassboxConfig::default());
    }

    parse_config_file(&config_path)
}

fn parse_config_file(config_path: &Path) -> Result<GlassboxConfig> {
    let content = fs_err::read_to_string(config_path).map_err(|err| GlassboxError::Io {
        context: format!("reading config {}", config_path.display()),
        source: err,
    })?;
    toml::from_str::<GlassboxConfig>(&content).map_err(|err| GlassboxError::ConfigMalformed {
        path: config_path.to_path_buf(),
        details: err.to_string(),
    })
}
