//! Per-batch artifacts
//!
//! Each batch gets its own folder under the run directory:
//!
//! ```text
//! batch_002/
//!   006_<name>.md          one file per successful record
//!   batch_002_summary.md   every record of the batch
//!   results.json           the batch's results, used to rebuild reports
//! ```
//!
//! Every file is rewritten on each write, so re-running a batch after a crash
//! overwrites the earlier attempt instead of appending to it.

use crate::model::BatchResult;
use crate::output::{ArtifactSink, OutputResult};
use crate::storage::{write_atomic, write_json_atomic};
use std::path::{Path, PathBuf};

const RESULTS_FILE: &str = "results.json";
const MAX_NAME_CHARS: usize = 80;

/// Writes batch folders under a run directory
#[derive(Debug, Clone)]
pub struct BatchArtifactWriter {
    run_dir: PathBuf,
}

impl BatchArtifactWriter {
    pub fn new(run_dir: &Path) -> Self {
        Self {
            run_dir: run_dir.to_path_buf(),
        }
    }

    pub fn batch_dir(&self, batch_number: usize) -> PathBuf {
        self.run_dir.join(format!("batch_{:03}", batch_number))
    }
}

impl ArtifactSink for BatchArtifactWriter {
    fn write_batch(&mut self, batch_number: usize, results: &[&BatchResult]) -> OutputResult<()> {
        let dir = self.batch_dir(batch_number);
        std::fs::create_dir_all(&dir)?;

        for result in results.iter().filter(|r| r.success) {
            let path = dir.join(record_file_name(result));
            write_atomic(&path, render_record(result).as_bytes())?;
        }

        let summary = render_batch_summary(batch_number, results);
        write_atomic(
            &dir.join(format!("batch_{:03}_summary.md", batch_number)),
            summary.as_bytes(),
        )?;

        write_json_atomic(&dir.join(RESULTS_FILE), &results)?;

        tracing::debug!(
            "Wrote batch {} artifacts to {}",
            batch_number,
            dir.display()
        );
        Ok(())
    }
}

/// Loads every `results.json` found under `run_dir`
///
/// Unreadable batch files are skipped with a warning.
pub fn load_batch_results(run_dir: &Path) -> Vec<BatchResult> {
    let entries = match std::fs::read_dir(run_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", run_dir.display(), e);
            return Vec::new();
        }
    };

    let mut batch_dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("batch_"))
                    .unwrap_or(false)
        })
        .collect();
    batch_dirs.sort();

    let mut results = Vec::new();
    for dir in batch_dirs {
        let path = dir.join(RESULTS_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        match serde_json::from_str::<Vec<BatchResult>>(&text) {
            Ok(batch) => results.extend(batch),
            Err(e) => tracing::warn!("Skipping corrupt {}: {}", path.display(), e),
        }
    }
    results
}

/// `NNN_<sanitized name>.md`, numbered by the record's position in the run
pub fn record_file_name(result: &BatchResult) -> String {
    let cleaned = sanitize_filename::sanitize(result.name.trim());
    let mut name: String = cleaned.chars().take(MAX_NAME_CHARS).collect();
    if name.trim().is_empty() {
        name = "record".to_string();
    }
    format!("{:03}_{}.md", result.ordinal(), name.trim())
}

fn render_record(result: &BatchResult) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", result.name));
    md.push_str(&format!("- **Source**: {}\n", result.source));
    md.push_str(&format!("- **URL**: {}\n", result.url));
    if let Some(payload) = &result.payload {
        if let Some(title) = &payload.title {
            md.push_str(&format!("- **Title**: {}\n", title));
        }
        md.push_str("\n---\n\n");
        md.push_str(payload.content.trim());
        md.push('\n');
    }
    md
}

fn render_batch_summary(batch_number: usize, results: &[&BatchResult]) -> String {
    let succeeded = results.iter().filter(|r| r.success).count();
    let mut md = String::new();

    md.push_str(&format!("# Batch {}\n\n", batch_number));
    if let (Some(first), Some(last)) = (results.first(), results.last()) {
        md.push_str(&format!(
            "- **Records**: {}-{}\n",
            first.ordinal(),
            last.ordinal()
        ));
    }
    md.push_str(&format!("- **Succeeded**: {}\n", succeeded));
    md.push_str(&format!("- **Failed**: {}\n\n", results.len() - succeeded));

    md.push_str("| # | Status | Source | Name | Error |\n");
    md.push_str("|---|--------|--------|------|-------|\n");
    for result in results {
        let status = if result.success { "ok" } else { "failed" };
        let error = match (&result.error_kind, &result.error_message) {
            (Some(kind), Some(message)) => format!("{}: {}", kind, message),
            (Some(kind), None) => kind.to_string(),
            _ => "-".to_string(),
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            result.ordinal(),
            status,
            result.source,
            result.name.replace('|', "\\|"),
            error.replace('|', "\\|")
        ));
    }
    md.push('\n');

    for result in results.iter().filter(|r| r.success) {
        if let Some(payload) = &result.payload {
            md.push_str(&format!("## {}. {}\n\n", result.ordinal(), result.name));
            md.push_str(payload.content.trim());
            md.push_str("\n\n");
        }
    }

    md
}
