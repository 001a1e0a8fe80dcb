//! Output sink traits and error types
//!
//! The batch runner reports through these two seams: one for per-batch
//! artifacts, one for the run-wide reports.

use crate::model::{BatchResult, ResultLog};
use crate::storage::{CheckpointState, StorageError};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives the results of each finished batch
pub trait ArtifactSink {
    /// Writes (or overwrites) the artifacts of one batch
    ///
    /// # Arguments
    ///
    /// * `batch_number` - The 1-based batch number
    /// * `results` - Every result of that batch, in record order
    fn write_batch(&mut self, batch_number: usize, results: &[&BatchResult]) -> OutputResult<()>;
}

/// Receives the cumulative state of the run after each batch
pub trait ReportSink {
    /// Rewrites the run-wide reports
    fn refresh(&mut self, results: &ResultLog, checkpoint: &CheckpointState) -> OutputResult<()>;
}
