//! File-backed snapshot persistence for the session record.
//!
//! Every save writes the complete record, never a diff. Writes go to a temp
//! file in the target directory and are renamed over the previous snapshot,
//! so a concurrent reader sees either the old or the new record, never a
//! partially written one.

use std::io::Write;
use std::path::{Path, PathBuf};

use glassbox_session_protocol::{parse_record, SessionRecord};
use tempfile::NamedTempFile;

use crate::error::{GlassboxError, Result};

/// Destination for session snapshots; optionally file-backed.
///
/// Create with [`SnapshotStore::new`] to persist, or
/// [`SnapshotStore::in_memory`] for tests.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    file_path: Option<PathBuf>,
}

impl SnapshotStore {
    pub fn new(file_path: &Path) -> Self {
        SnapshotStore {
            file_path: Some(file_path.to_path_buf()),
        }
    }

    pub fn in_memory() -> Self {
        SnapshotStore { file_path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Creates the directory that will hold the snapshot.
    pub fn prepare(&self) -> Result<()> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };
        let parent = parent_dir(file_path);
        fs_err::create_dir_all(parent).map_err(|err| GlassboxError::Io {
            context: "creating session log directory".to_string(),
            source: err,
        })
    }

    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(record).map_err(|err| GlassboxError::Json {
            context: "serializing session record".to_string(),
            source: err,
        })?;

        atomic_write(file_path, content.as_bytes()).map_err(|source| GlassboxError::Persist {
            path: file_path.clone(),
            source,
        })
    }
}

/// Replaces `file_path` with `content` via a temp file in the same directory.
pub(crate) fn atomic_write(file_path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut temp_file = NamedTempFile::new_in(parent_dir(file_path))?;
    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file.persist(file_path).map_err(|err| err.error)?;
    Ok(())
}

pub(crate) fn parent_dir(file_path: &Path) -> &Path {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Reads a persisted snapshot.
pub fn load_record(file_path: &Path) -> Result<SessionRecord> {
    let content = fs_err::read_to_string(file_path).map_err(|err| GlassboxError::Io {
        context: "reading session log".to_string(),
        source: err,
    })?;
    parse_record(&content).map_err(|err| GlassboxError::Json {
        context: format!("parsing session log {}", file_path.display()),
        source: err,
    })
}
