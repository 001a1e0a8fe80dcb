//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and the
//! associated error types.

use crate::storage::CheckpointState;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path has no parent directory: {0}")]
    NoParent(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A single-slot, durable checkpoint
///
/// Implementations keep `start_time` pinned once it has been seen and only
/// persist an `end_time` for a completed run.
pub trait CheckpointStore {
    /// Loads the saved checkpoint
    ///
    /// # Returns
    ///
    /// `None` for a fresh run. An unreadable or corrupt checkpoint is also
    /// reported as `None`; it never aborts the run.
    fn load(&mut self) -> Option<CheckpointState>;

    /// Persists `state`, replacing the previous checkpoint atomically
    fn save(&mut self, state: &CheckpointState) -> StorageResult<()>;
}
