//! Window title → activity state classification.
//!
//! Titles are lowercased and tested against the CODING keywords first, then
//! RESEARCHING. The first substring hit wins, so a title naming both an editor
//! and a browser classifies as CODING. Anything else, including an empty
//! title, is IDLE.

use glassbox_session_protocol::ActivityState;

pub const CODING_KEYWORDS: &[&str] = &[
    "code",
    "pycharm",
    "visual studio",
    "sublime",
    "vim",
    ".py",
    "main.py",
    "vscode",
];

pub const RESEARCHING_KEYWORDS: &[&str] = &[
    "chrome",
    "firefox",
    "edge",
    "stack overflow",
    "google",
    "documentation",
    "gpt",
    "claude",
];

/// Classifies a title with the built-in keyword lists.
pub fn classify(title: &str) -> ActivityState {
    classify_with(title, CODING_KEYWORDS, RESEARCHING_KEYWORDS)
}

fn classify_with<C, R>(title: &str, coding: &[C], researching: &[R]) -> ActivityState
where
    C: AsRef<str>,
    R: AsRef<str>,
{
    if title.trim().is_empty() {
        return ActivityState::Idle;
    }

    let title = title.to_lowercase();
    if coding.iter().any(|key| title.contains(key.as_ref())) {
        return ActivityState::Coding;
    }
    if researching.iter().any(|key| title.contains(key.as_ref())) {
        return ActivityState::Researching;
    }
    ActivityState::Idle
}

/// Keyword classifier with configurable lists (keywords are matched lowercase).
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    coding: Vec<String>,
    researching: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            coding: CODING_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            researching: RESEARCHING_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordClassifier {
    pub fn new(coding: Vec<String>, researching: Vec<String>) -> Self {
        Self {
            coding: coding.into_iter().map(|k| k.to_lowercase()).collect(),
            researching: researching.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn classify(&self, title: &str) -> ActivityState {
        classify_with(title, &self.coding, &self.researching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_is_idle() {
        assert_eq!(classify(""), ActivityState::Idle);
        assert_eq!(classify("   "), ActivityState::Idle);
    }

    #[test]
    fn coding_takes_precedence_over_researching() {
        assert_eq!(classify("using vscode and chrome"), ActivityState::Coding);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("Stack Overflow - Mozilla Firefox"), ActivityState::Researching);
        assert_eq!(classify("MAIN.PY - PyCharm"), ActivityState::Coding);
    }

    #[test]
    fn unknown_title_is_idle() {
        assert_eq!(classify("Spotify Premium"), ActivityState::Idle);
    }

    #[test]
    fn placeholder_title_is_researching() {
        assert_eq!(
            classify("Mock Window - Google Chrome"),
            ActivityState::Researching
        );
    }

    #[test]
    fn custom_classifier_uses_its_own_lists() {
        let classifier = KeywordClassifier::new(vec!["Helix".to_string()], vec!["arxiv".to_string()]);
        assert_eq!(classifier.classify("helix ~/src"), ActivityState::Coding);
        assert_eq!(classifier.classify("arXiv listing"), ActivityState::Researching);
        assert_eq!(classifier.classify("vscode"), ActivityState::Idle);
    }
}
