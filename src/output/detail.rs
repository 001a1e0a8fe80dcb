//! Cumulative detail report: every processed record, grouped by batch

use crate::model::ResultLog;
use crate::storage::CheckpointState;
use chrono::{DateTime, Utc};

/// Renders the detail report
pub fn render_detail(
    results: &ResultLog,
    checkpoint: &CheckpointState,
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str("# Harvest Detail\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Processed**: {} / {}\n",
        checkpoint.processed_count, checkpoint.total_count
    ));
    md.push_str(&format!(
        "- **Records in report**: {}\n\n",
        results.len()
    ));

    if results.is_empty() {
        md.push_str("No records processed yet.\n");
        return md;
    }

    for number in results.batch_numbers() {
        let batch = results.for_batch(number);
        let succeeded = batch.iter().filter(|r| r.success).count();

        md.push_str(&format!("## Batch {}\n\n", number));
        md.push_str(&format!(
            "Succeeded: {}, failed: {}\n\n",
            succeeded,
            batch.len() - succeeded
        ));

        for result in batch {
            md.push_str(&format!("### {}. {}\n\n", result.ordinal(), result.name));
            md.push_str(&format!("- **Source**: {}\n", result.source));
            md.push_str(&format!("- **URL**: {}\n", result.url));

            match (&result.payload, result.success) {
                (Some(payload), true) => {
                    md.push_str("- **Status**: ok\n");
                    if let Some(title) = &payload.title {
                        md.push_str(&format!("- **Title**: {}\n", title));
                    }
                    md.push('\n');
                    md.push_str(payload.content.trim());
                    md.push_str("\n\n");
                }
                _ => {
                    let kind = result
                        .error_kind
                        .map(|k| k.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    md.push_str(&format!("- **Status**: failed ({})\n", kind));
                    md.push_str(&format!(
                        "- **Error**: {}\n\n",
                        result.error_message.as_deref().unwrap_or("-")
                    ));
                }
            }
        }

        md.push_str("---\n\n");
    }

    md
}
