//! Output module for reports and batch artifacts
//!
//! This module handles:
//! - Writing per-batch folders (record files, batch summary, results)
//! - Rendering the progress and detail reports of a run
//! - Printing run statistics

mod artifacts;
mod detail;
mod progress;
pub mod stats;
mod traits;

pub use artifacts::{load_batch_results, record_file_name, BatchArtifactWriter};
pub use detail::render_detail;
pub use progress::render_progress;
pub use stats::{load_statistics, print_statistics, RunStatistics};
pub use traits::{ArtifactSink, OutputError, OutputResult, ReportSink};

use crate::batch::BatchPlan;
use crate::model::ResultLog;
use crate::storage::{write_atomic, CheckpointState};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// File name of the progress report
pub const PROGRESS_FILE: &str = "00_PROGRESS.md";

/// File name of the detail report
pub const DETAIL_FILE: &str = "00_DETAIL.md";

/// Writes the two run-wide reports into a run directory
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    run_dir: PathBuf,
    batch_size: Option<usize>,
}

impl ReportGenerator {
    pub fn new(run_dir: &Path, batch_size: Option<usize>) -> Self {
        Self {
            run_dir: run_dir.to_path_buf(),
            batch_size,
        }
    }

    pub fn progress_path(&self) -> PathBuf {
        self.run_dir.join(PROGRESS_FILE)
    }

    pub fn detail_path(&self) -> PathBuf {
        self.run_dir.join(DETAIL_FILE)
    }

    /// Rewrites both reports, stamped with `generated_at`
    pub fn refresh_at(
        &self,
        results: &ResultLog,
        checkpoint: &CheckpointState,
        generated_at: DateTime<Utc>,
    ) -> OutputResult<()> {
        let batch_size = self.batch_size.or(checkpoint.batch_size);
        let plan = batch_size.and_then(|size| BatchPlan::new(checkpoint.total_count, size).ok());

        let progress = render_progress(results, checkpoint, plan.as_ref(), generated_at);
        write_atomic(&self.progress_path(), progress.as_bytes())?;

        let detail = render_detail(results, checkpoint, generated_at);
        write_atomic(&self.detail_path(), detail.as_bytes())?;

        tracing::debug!("Reports refreshed in {}", self.run_dir.display());
        Ok(())
    }
}

impl ReportSink for ReportGenerator {
    fn refresh(&mut self, results: &ResultLog, checkpoint: &CheckpointState) -> OutputResult<()> {
        self.refresh_at(results, checkpoint, Utc::now())
    }
}

/// Formats a duration as `1h 02m 03s`, `2m 03s` or `3s`
pub fn format_duration(duration: chrono::Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
