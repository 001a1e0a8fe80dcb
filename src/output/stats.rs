//! Run statistics for the `--stats` mode
//!
//! This module builds a summary from a run's checkpoint and batch results
//! and prints it to stdout.

use crate::model::ResultLog;
use crate::output::format_duration;
use crate::state::ErrorKind;
use crate::storage::CheckpointState;
use std::collections::HashMap;

/// Summary of one fetch run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub progress_percentage: f64,
    pub success_rate: f64,
    pub completed: bool,
    pub duration: chrono::Duration,

    /// Failure counts from the batch results on disk
    pub failures_by_kind: HashMap<ErrorKind, usize>,
}

/// Builds statistics from a checkpoint and the results restored for it
///
/// Counts come from the checkpoint; only the failure breakdown is read from
/// the results.
pub fn load_statistics(checkpoint: &CheckpointState, results: &ResultLog) -> RunStatistics {
    let mut failures_by_kind = HashMap::new();
    for failure in results.failures() {
        if let Some(kind) = failure.error_kind {
            *failures_by_kind.entry(kind).or_insert(0) += 1;
        }
    }

    RunStatistics {
        processed: checkpoint.processed_count,
        total: checkpoint.total_count,
        succeeded: checkpoint.success_count,
        failed: checkpoint.fail_count,
        progress_percentage: checkpoint.progress_percentage(),
        success_rate: checkpoint.success_rate(),
        completed: checkpoint.is_completed,
        duration: checkpoint.duration(),
        failures_by_kind,
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!(
        "  Processed: {} / {} ({:.1}%)",
        stats.processed, stats.total, stats.progress_percentage
    );
    println!("  Succeeded: {}", stats.succeeded);
    println!("  Failed: {}", stats.failed);
    println!(
        "  Status: {}",
        if stats.completed {
            "completed"
        } else {
            "in progress"
        }
    );
    println!("  Duration: {}", format_duration(stats.duration));
    println!();

    if !stats.failures_by_kind.is_empty() {
        println!("Failures by Kind:");
        let mut kinds: Vec<_> = stats.failures_by_kind.iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(a.1).then(a.0.as_str().cmp(b.0.as_str())));

        for (kind, count) in kinds {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} records)",
        stats.success_rate, stats.succeeded, stats.processed
    );
}
