//! Batch execution of the fetch phase
//!
//! # Components
//!
//! - `BatchPlan` / `BatchWindow`: fixed-size partition of the record set
//! - `RunContext`: the run's directory, checkpoint and results, owned by the
//!   caller and threaded through the runner
//! - `BatchRunner`: sequential per-record processing with a checkpoint, batch
//!   artifacts and report refresh after every window

mod plan;
mod runner;

pub use plan::{BatchPlan, BatchWindow};
pub use runner::{BatchRunner, RunnerSettings};

use crate::model::ResultLog;
use crate::storage::CheckpointState;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Everything a fetch run carries from batch to batch
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_dir: PathBuf,
    pub batch_size: usize,
    pub checkpoint: CheckpointState,
    pub results: ResultLog,
}

impl RunContext {
    /// Context of a run that has not processed anything yet
    pub fn fresh(
        run_dir: &Path,
        total: usize,
        batch_size: usize,
        config_hash: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut checkpoint = CheckpointState::new(total, run_dir, now);
        checkpoint.batch_size = Some(batch_size);
        checkpoint.config_hash = config_hash;

        Self {
            run_dir: run_dir.to_path_buf(),
            batch_size,
            checkpoint,
            results: ResultLog::new(),
        }
    }

    /// Context of an interrupted run
    ///
    /// The checkpoint's counts are trusted as saved; `results` only feeds the
    /// reports. The batch size recorded in the checkpoint wins over
    /// `batch_size` so batch numbers stay aligned with the first attempt.
    pub fn resume(
        run_dir: &Path,
        checkpoint: CheckpointState,
        results: ResultLog,
        batch_size: usize,
    ) -> Self {
        let batch_size = match checkpoint.batch_size {
            Some(saved) if saved != batch_size => {
                tracing::warn!(
                    "Run was started with batch size {}, ignoring {}",
                    saved,
                    batch_size
                );
                saved
            }
            Some(saved) => saved,
            None => batch_size,
        };
        let mut checkpoint = checkpoint;
        checkpoint.batch_size = Some(batch_size);

        Self {
            run_dir: run_dir.to_path_buf(),
            batch_size,
            checkpoint,
            results,
        }
    }

    /// Global index the next run starts at
    pub fn resume_offset(&self) -> usize {
        self.checkpoint.processed_count
    }
}
