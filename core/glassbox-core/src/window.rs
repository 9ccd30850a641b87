//! Foreground window inspection.
//!
//! Inspection never fails from the caller's point of view: when the platform
//! tool is missing the inspector degrades to [`PLACEHOLDER_TITLE`], and when
//! the tool runs but reports nothing the title is empty (classified IDLE).

use std::collections::VecDeque;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::info;

pub const PLACEHOLDER_TITLE: &str = "Mock Window - Google Chrome";

pub trait WindowInspector: Send + Sync {
    fn active_window_title(&self) -> String;
}

/// Queries the OS for the focused window title through a helper command.
#[derive(Debug, Default)]
pub struct CommandWindowInspector {
    unavailable_logged: AtomicBool,
}

impl CommandWindowInspector {
    pub fn new() -> Self {
        Self::default()
    }

    fn note_unavailable(&self, program: &str) {
        if !self.unavailable_logged.swap(true, Ordering::Relaxed) {
            info!(
                program,
                placeholder = PLACEHOLDER_TITLE,
                "Window inspection unavailable; using placeholder title"
            );
        }
    }
}

impl WindowInspector for CommandWindowInspector {
    fn active_window_title(&self) -> String {
        let (program, args) = inspection_command();
        match run_inspection(program, args) {
            InspectionResult::Title(title) => title,
            InspectionResult::Failed => String::new(),
            InspectionResult::Unavailable => {
                self.note_unavailable(program);
                PLACEHOLDER_TITLE.to_string()
            }
        }
    }
}

enum InspectionResult {
    Title(String),
    Failed,
    Unavailable,
}

#[cfg(target_os = "macos")]
fn inspection_command() -> (&'static str, &'static [&'static str]) {
    (
        "osascript",
        &[
            "-e",
            "tell application \"System Events\" to get name of first application process whose frontmost is true",
        ],
    )
}

#[cfg(not(target_os = "macos"))]
fn inspection_command() -> (&'static str, &'static [&'static str]) {
    ("xdotool", &["getactivewindow", "getwindowname"])
}

fn run_inspection(program: &str, args: &[&str]) -> InspectionResult {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
            InspectionResult::Title(title)
        }
        Ok(_) => InspectionResult::Failed,
        Err(_) => InspectionResult::Unavailable,
    }
}

/// Always reports the same title.
#[derive(Debug, Clone)]
pub struct FixedWindowInspector {
    title: String,
}

impl FixedWindowInspector {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl WindowInspector for FixedWindowInspector {
    fn active_window_title(&self) -> String {
        self.title.clone()
    }
}

/// Replays a sequence of titles; the last one repeats once the queue drains.
#[derive(Debug, Default)]
pub struct ScriptedWindowInspector {
    titles: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl ScriptedWindowInspector {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: Mutex::new(titles.into_iter().map(Into::into).collect()),
            last: Mutex::new(String::new()),
        }
    }
}

impl WindowInspector for ScriptedWindowInspector {
    fn active_window_title(&self) -> String {
        let next = self
            .titles
            .lock()
            .ok()
            .and_then(|mut titles| titles.pop_front());
        let Ok(mut last) = self.last.lock() else {
            return next.unwrap_or_default();
        };
        if let Some(title) = next {
            *last = title;
        }
        last.clone()
    }
}
