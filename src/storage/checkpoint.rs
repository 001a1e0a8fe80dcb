//! Checkpoint state and its JSON-backed store

use crate::storage::{write_json_atomic, CheckpointStore, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the checkpoint inside a run directory
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Progress of one fetch run
///
/// Counts only move through [`record_batch`](Self::record_batch), which keeps
/// `success_count + fail_count == processed_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_update: DateTime<Utc>,
    pub processed_count: usize,
    pub total_count: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub is_completed: bool,
    pub output_location: PathBuf,

    /// Batch size the run was started with
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Hash of the configuration the run was started with
    #[serde(default)]
    pub config_hash: Option<String>,
}

impl CheckpointState {
    /// Creates the state of a run that has not processed anything yet
    pub fn new(total_count: usize, output_location: &Path, now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            end_time: None,
            last_update: now,
            processed_count: 0,
            total_count,
            success_count: 0,
            fail_count: 0,
            is_completed: false,
            output_location: output_location.to_path_buf(),
            batch_size: None,
            config_hash: None,
        }
    }

    /// Adds one finished window to the tallies
    pub fn record_batch(&mut self, successes: usize, failures: usize, now: DateTime<Utc>) {
        self.success_count += successes;
        self.fail_count += failures;
        self.processed_count += successes + failures;
        self.last_update = now;
    }

    /// Marks the run complete and stamps the end time
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.is_completed = true;
        self.end_time = Some(now);
        self.last_update = now;
    }

    /// Processed share in percent; 0 for an empty run
    pub fn progress_percentage(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.processed_count as f64 * 100.0 / self.total_count as f64
        }
    }

    /// Success share of the processed records in percent
    pub fn success_rate(&self) -> f64 {
        if self.processed_count == 0 {
            0.0
        } else {
            self.success_count as f64 * 100.0 / self.processed_count as f64
        }
    }

    pub fn remaining(&self) -> usize {
        self.total_count.saturating_sub(self.processed_count)
    }

    /// Elapsed time until the end time, or until the last update
    pub fn duration(&self) -> chrono::Duration {
        self.end_time.unwrap_or(self.last_update) - self.start_time
    }

    pub fn is_consistent(&self) -> bool {
        self.success_count + self.fail_count == self.processed_count
            && self.processed_count <= self.total_count
    }
}

/// Checkpoint stored as pretty JSON in `checkpoint.json`
#[derive(Debug)]
pub struct JsonCheckpointStore {
    path: PathBuf,
    pinned_start: Option<DateTime<Utc>>,
}

impl JsonCheckpointStore {
    /// Store for the checkpoint of `run_dir`
    pub fn new(run_dir: &Path) -> Self {
        Self::at(run_dir.join(CHECKPOINT_FILE))
    }

    /// Store backed by an explicit file
    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            pinned_start: None,
        }
    }

    /// Keeps `start_time` on every save, whatever the saved state carries
    pub fn pinned(mut self, start_time: DateTime<Utc>) -> Self {
        self.pinned_start = Some(start_time);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&mut self) -> Option<CheckpointState> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    "Checkpoint {} is unreadable, starting fresh: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_str::<CheckpointState>(&text) {
            Ok(state) => {
                self.pinned_start = Some(state.start_time);
                Some(state)
            }
            Err(e) => {
                tracing::warn!(
                    "Checkpoint {} is corrupt, starting fresh: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn save(&mut self, state: &CheckpointState) -> StorageResult<()> {
        let mut state = state.clone();
        state.start_time = *self.pinned_start.get_or_insert(state.start_time);
        if !state.is_completed {
            state.end_time = None;
        }

        write_json_atomic(&self.path, &state)?;
        tracing::debug!(
            "Checkpoint saved: {}/{}",
            state.processed_count,
            state.total_count
        );
        Ok(())
    }
}
