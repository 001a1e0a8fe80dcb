//! Run directory layout and discovery

use crate::storage::{CheckpointState, CheckpointStore, JsonCheckpointStore, StorageResult};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

const RUN_PREFIX: &str = "run_";

/// Creates a fresh `run_<YYYYmmdd_HHMMSS>` directory under `root`
///
/// A second run in the same second gets a zero-padded `_NNN` suffix so run
/// names keep sorting in creation order.
pub fn new_run_dir(root: &Path, now: DateTime<Utc>) -> StorageResult<PathBuf> {
    std::fs::create_dir_all(root)?;

    let base = format!("{}{}", RUN_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let mut candidate = root.join(&base);
    let mut suffix = 2;
    while candidate.exists() {
        candidate = root.join(format!("{}_{:03}", base, suffix));
        suffix += 1;
    }

    std::fs::create_dir(&candidate)?;
    tracing::info!("Created run directory {}", candidate.display());
    Ok(candidate)
}

/// Lists run directories under `root`, oldest first
pub fn list_run_dirs(root: &Path) -> StorageResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        let is_run = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(RUN_PREFIX))
            .unwrap_or(false);
        if is_run && entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// The newest run directory, complete or not
pub fn latest_run_dir(root: &Path) -> StorageResult<Option<PathBuf>> {
    Ok(list_run_dirs(root)?.pop())
}

/// Finds the newest run whose checkpoint is not complete
///
/// Runs without a readable checkpoint are skipped.
pub fn find_resumable_run(root: &Path) -> StorageResult<Option<(PathBuf, CheckpointState)>> {
    for dir in list_run_dirs(root)?.into_iter().rev() {
        let mut store = JsonCheckpointStore::new(&dir);
        match store.load() {
            Some(state) if !state.is_completed => return Ok(Some((dir, state))),
            Some(_) => tracing::debug!("Run {} is complete", dir.display()),
            None => tracing::debug!("Run {} has no checkpoint", dir.display()),
        }
    }
    Ok(None)
}
