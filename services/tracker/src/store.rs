//! State Store
//!
//! Reads and writes the learner record (`stats.json`) and the rewarded-topic
//! snapshot (`.completed_topics`). A missing file means a first run; a file that
//! exists but cannot be parsed is an error, so earned XP is never silently reset.

use codequest_core::{CompletedTopics, LearnerState};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },
    #[error("Malformed state file {}: {}", .path.display(), .source)]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {}: {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },
}

/// File locations for the two persisted artifacts.
#[derive(Debug, Clone)]
pub struct StateStore {
    state_path: PathBuf,
    snapshot_path: PathBuf,
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn stage<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    let staged = staging_path(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&staged, json).map_err(|source| StoreError::Write {
        path: staged.clone(),
        source,
    })?;
    Ok(staged)
}

fn commit(staged: &Path, path: &Path) -> Result<(), StoreError> {
    fs::rename(staged, path).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl StateStore {
    pub fn new(state_path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            snapshot_path: snapshot_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Loads the learner state, or first-run defaults for `username` if none exists.
    pub fn load_state(&self, username: &str) -> Result<LearnerState, StoreError> {
        let Some(text) = read_optional(&self.state_path)? else {
            info!(path = %self.state_path.display(), "No saved state; starting fresh");
            return Ok(LearnerState::new(username));
        };

        let mut state: LearnerState =
            serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                path: self.state_path.clone(),
                source,
            })?;
        if state.username.trim().is_empty() {
            state.username = username.to_string();
        }
        debug!(total_xp = state.total_xp, level = state.level, "Loaded learner state");
        Ok(state)
    }

    /// Loads the rewarded-topic snapshot. A JSON `null` reads as empty.
    pub fn load_snapshot(&self) -> Result<CompletedTopics, StoreError> {
        let Some(text) = read_optional(&self.snapshot_path)? else {
            return Ok(CompletedTopics::default());
        };

        let topics: Option<CompletedTopics> =
            serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                path: self.snapshot_path.clone(),
                source,
            })?;
        Ok(topics.unwrap_or_default())
    }

    /// Persists both artifacts.
    ///
    /// Both files are staged before either is replaced, and the snapshot is
    /// replaced first: if the state write then fails, the next run sees the
    /// topics as already rewarded and cannot credit them twice.
    pub fn save(&self, state: &LearnerState, snapshot: &CompletedTopics) -> Result<(), StoreError> {
        let staged_snapshot = stage(&self.snapshot_path, snapshot)?;
        let staged_state = match stage(&self.state_path, state) {
            Ok(staged) => staged,
            Err(e) => {
                let _ = fs::remove_file(&staged_snapshot);
                return Err(e);
            }
        };

        if let Err(e) = commit(&staged_snapshot, &self.snapshot_path) {
            let _ = fs::remove_file(&staged_snapshot);
            let _ = fs::remove_file(&staged_state);
            return Err(e);
        }
        if let Err(e) = commit(&staged_state, &self.state_path) {
            let _ = fs::remove_file(&staged_state);
            return Err(e);
        }

        info!(
            state = %self.state_path.display(),
            snapshot = %self.snapshot_path.display(),
            "Progress saved"
        );
        Ok(())
    }
}
