//! Structured logging to a daily-rolling file under `~/.glassbox/logs/`.
//!
//! Stdout belongs to the command's own output, so events go to the file.
//! `GLASSBOX_DEBUG_LOG=1` forces debug level; otherwise `RUST_LOG` applies,
//! defaulting to info.

use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "glassbox.log";

/// Installs the global subscriber. Keep the returned guard alive for the
/// whole process so buffered events are flushed on exit.
pub fn init() -> Option<WorkerGuard> {
    let filter = build_filter(env::var("GLASSBOX_DEBUG_LOG").ok().as_deref());

    let log_dir = match glassbox_core::get_log_dir() {
        Ok(dir) => dir,
        Err(_) => {
            init_stderr(filter);
            return None;
        }
    };
    if fs_err::create_dir_all(&log_dir).is_err() {
        init_stderr(filter);
        return None;
    }

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .is_ok();

    installed.then_some(guard)
}

fn init_stderr(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn debug_forced(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "TRUE" | "yes" | "YES"))
}

fn build_filter(debug_var: Option<&str>) -> EnvFilter {
    if debug_forced(debug_var) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_accepts_common_truthy_values() {
        for value in ["1", "true", "TRUE", "yes", "YES"] {
            assert!(debug_forced(Some(value)), "{value} should force debug");
        }
        assert!(!debug_forced(Some("0")));
        assert!(!debug_forced(Some("")));
        assert!(!debug_forced(None));
    }
}
