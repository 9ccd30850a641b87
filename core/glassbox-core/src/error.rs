//! Error types for glassbox-core operations.

use std::path::PathBuf;

/// All errors that can occur in glassbox-core operations.
#[derive(Debug, thiserror::Error)]
pub enum GlassboxError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Session already finalized: {session_id}")]
    AlreadyFinalized { session_id: String },

    #[error("A finalized session needs a PASS or FAIL verdict")]
    PendingVerdict,

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to persist session record to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using GlassboxError.
pub type Result<T> = std::result::Result<T, GlassboxError>;

impl From<GlassboxError> for String {
    fn from(err: GlassboxError) -> String {
        err.to_string()
    }
}
