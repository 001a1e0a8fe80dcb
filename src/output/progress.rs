//! Progress report rendering
//!
//! The progress report is the always-current overview of a run: totals,
//! per-batch status and a list of failed records.

use crate::batch::BatchPlan;
use crate::model::ResultLog;
use crate::output::format_duration;
use crate::state::BatchStatus;
use crate::storage::CheckpointState;
use chrono::{DateTime, Utc};

/// Renders the progress report
///
/// # Arguments
///
/// * `results` - Every result known for the run
/// * `checkpoint` - The latest checkpoint
/// * `plan` - Batch partition of the run, if the batch size is known
/// * `generated_at` - Timestamp printed in the header
///
/// # Returns
///
/// The markdown text. Apart from the `Generated` line, the output depends
/// only on `results`, `checkpoint` and `plan`.
pub fn render_progress(
    results: &ResultLog,
    checkpoint: &CheckpointState,
    plan: Option<&BatchPlan>,
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str("# Harvest Progress\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Started**: {}\n",
        checkpoint.start_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Last Update**: {}\n",
        checkpoint.last_update.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(end) = checkpoint.end_time {
        md.push_str(&format!(
            "- **Finished**: {}\n",
            end.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    md.push_str(&format!(
        "- **Duration**: {}\n",
        format_duration(checkpoint.duration())
    ));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if checkpoint.is_completed {
            "completed"
        } else {
            "in progress"
        }
    ));
    md.push_str(&format!(
        "- **Output**: {}\n\n",
        checkpoint.output_location.display()
    ));

    md.push_str("## Overall Progress\n\n");
    md.push_str(&format!(
        "- **Processed**: {} / {} ({:.1}%)\n",
        checkpoint.processed_count,
        checkpoint.total_count,
        checkpoint.progress_percentage()
    ));
    md.push_str(&format!("- **Succeeded**: {}\n", checkpoint.success_count));
    md.push_str(&format!("- **Failed**: {}\n", checkpoint.fail_count));
    md.push_str(&format!(
        "- **Success Rate**: {:.1}%\n",
        checkpoint.success_rate()
    ));
    md.push_str(&format!("- **Remaining**: {}\n\n", checkpoint.remaining()));

    if let Some(plan) = plan {
        md.push_str("## Batches\n\n");
        if plan.batch_count() == 0 {
            md.push_str("No records to process.\n\n");
        } else {
            md.push_str("| Batch | Records | Status | Succeeded | Failed |\n");
            md.push_str("|-------|---------|--------|-----------|--------|\n");
            for number in 1..=plan.batch_count() {
                let window = plan.window(number);
                let status =
                    BatchStatus::derive(window.start, window.end, checkpoint.processed_count);
                let batch = results.for_batch(number);
                let succeeded = batch.iter().filter(|r| r.success).count();
                md.push_str(&format!(
                    "| {} | {}-{} | {} | {} | {} |\n",
                    number,
                    window.start + 1,
                    window.end,
                    status,
                    succeeded,
                    batch.len() - succeeded
                ));
            }
            md.push('\n');
        }
    }

    md.push_str("## Failures\n\n");
    let failures: Vec<_> = results.failures().collect();
    if failures.is_empty() {
        md.push_str("None.\n");
    } else {
        md.push_str("| # | Batch | Name | Kind | Error |\n");
        md.push_str("|---|-------|------|------|-------|\n");
        for failure in failures {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                failure.ordinal(),
                failure.batch_number,
                escape_cell(&failure.name),
                failure
                    .error_kind
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                escape_cell(failure.error_message.as_deref().unwrap_or("-"))
            ));
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
