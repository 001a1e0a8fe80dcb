//! Storage module for persisting harvest progress
//!
//! This module handles every file the pipeline writes durably:
//! - The single-slot checkpoint of a fetch run
//! - The URL manifest shared by both phases
//! - Run directory creation and discovery for resumption
//! - Atomic write-then-rename helpers used by all of the above

mod atomic;
mod checkpoint;
mod manifest;
mod runs;
mod traits;

pub use atomic::{write_atomic, write_json_atomic};
pub use checkpoint::{CheckpointState, JsonCheckpointStore, CHECKPOINT_FILE};
pub use manifest::{format_rate, Manifest, ManifestMetadata, ManifestStatistics};
pub use runs::{find_resumable_run, latest_run_dir, list_run_dirs, new_run_dir};
pub use traits::{CheckpointStore, StorageError, StorageResult};
