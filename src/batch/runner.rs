//! Sequential batch runner
//!
//! Records are processed one at a time in global order. After each window
//! the runner writes the batch artifacts, folds the window into the
//! checkpoint, saves it and refreshes the reports, in that order. A crash
//! mid-window therefore loses at most that window, and the next run redoes it
//! from its first record.

use crate::batch::{BatchPlan, BatchWindow, RunContext};
use crate::clock::Clock;
use crate::config::BatchConfig;
use crate::fetch::RecordProcessor;
use crate::model::{BatchResult, RecordFailure, ResultLog, UrlRecord};
use crate::output::{ArtifactSink, ReportSink};
use crate::state::ErrorKind;
use crate::storage::CheckpointStore;
use crate::{Result, WaymarkError};
use chrono::Utc;
use std::time::Duration;

/// Pacing between records and between batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub record_delay: Duration,
    pub batch_delay: Duration,
}

impl RunnerSettings {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            record_delay: Duration::from_millis(config.record_delay_ms),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        }
    }
}

/// Drives a record set through a [`RecordProcessor`] in checkpointed windows
pub struct BatchRunner<S, A, R, C> {
    store: S,
    artifacts: A,
    reports: R,
    clock: C,
    settings: RunnerSettings,
}

impl<S, A, R, C> BatchRunner<S, A, R, C>
where
    S: CheckpointStore,
    A: ArtifactSink,
    R: ReportSink,
    C: Clock,
{
    pub fn new(store: S, artifacts: A, reports: R, clock: C, settings: RunnerSettings) -> Self {
        Self {
            store,
            artifacts,
            reports,
            clock,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    pub fn reports(&self) -> &R {
        &self.reports
    }

    /// Processes `records[ctx.resume_offset()..]`
    ///
    /// # Arguments
    ///
    /// * `records` - The full, ordered record set of the run
    /// * `ctx` - The run's context; its checkpoint must cover `records.len()`
    /// * `processor` - Fetches and extracts one record
    ///
    /// # Returns
    ///
    /// The run's results. Record failures never surface as `Err`; only a
    /// batch size of zero or a record count that disagrees with the
    /// checkpoint do.
    pub async fn run<'c, P: RecordProcessor>(
        &mut self,
        records: &[UrlRecord],
        ctx: &'c mut RunContext,
        processor: &mut P,
    ) -> Result<&'c ResultLog> {
        let plan = BatchPlan::new(records.len(), ctx.batch_size)?;
        if ctx.checkpoint.total_count != records.len() {
            return Err(WaymarkError::RecordCountMismatch {
                expected: ctx.checkpoint.total_count,
                found: records.len(),
            });
        }

        let offset = ctx.resume_offset().min(records.len());
        let windows = plan.windows_from(offset);

        if offset > 0 {
            tracing::info!(
                "Resuming at record {} of {} (batch {})",
                offset + 1,
                records.len(),
                plan.batch_number(offset)
            );
        }
        tracing::info!(
            "{} records to process in {} batches of {}",
            records.len() - offset,
            windows.len(),
            plan.batch_size()
        );

        if windows.is_empty() {
            if !ctx.checkpoint.is_completed {
                ctx.checkpoint.complete(Utc::now());
            }
            self.persist(ctx);
            return Ok(&ctx.results);
        }

        let last = windows.len() - 1;
        for (i, window) in windows.iter().enumerate() {
            self.run_window(records, *window, &plan, ctx, processor)
                .await;

            let now = Utc::now();
            if i == last {
                ctx.checkpoint.complete(now);
            }
            self.persist(ctx);

            tracing::info!(
                "Progress: {}/{} ({:.1}%), {} ok, {} failed",
                ctx.checkpoint.processed_count,
                ctx.checkpoint.total_count,
                ctx.checkpoint.progress_percentage(),
                ctx.checkpoint.success_count,
                ctx.checkpoint.fail_count
            );

            if i != last {
                self.clock.sleep(self.settings.batch_delay).await;
            }
        }

        tracing::info!(
            "Run complete: {} succeeded, {} failed",
            ctx.checkpoint.success_count,
            ctx.checkpoint.fail_count
        );
        Ok(&ctx.results)
    }

    async fn run_window<P: RecordProcessor>(
        &mut self,
        records: &[UrlRecord],
        window: BatchWindow,
        plan: &BatchPlan,
        ctx: &mut RunContext,
        processor: &mut P,
    ) {
        tracing::info!(
            "Batch {}/{}: records {}-{}",
            window.number,
            plan.batch_count(),
            window.start + 1,
            window.end
        );

        let mut succeeded = 0;
        let mut failed = 0;
        for index in window.range() {
            let result = self
                .process_record(index, window.number, &records[index], processor)
                .await;
            if result.success {
                succeeded += 1;
            } else {
                failed += 1;
            }
            ctx.results.push(result);
        }

        let batch_results = ctx.results.for_batch(window.number);
        if let Err(e) = self.artifacts.write_batch(window.number, &batch_results) {
            tracing::warn!("Failed to write artifacts of batch {}: {}", window.number, e);
        }

        ctx.checkpoint.record_batch(succeeded, failed, Utc::now());
    }

    async fn process_record<P: RecordProcessor>(
        &mut self,
        index: usize,
        batch_number: usize,
        record: &UrlRecord,
        processor: &mut P,
    ) -> BatchResult {
        let Some(url) = record.usable_url() else {
            tracing::warn!("[{}] {}: no usable URL", index + 1, record.name);
            return BatchResult::failure(
                index,
                batch_number,
                record,
                RecordFailure::new(ErrorKind::EmptyUrl, "record has no usable URL"),
            );
        };

        let outcome = processor.process(url, record).await;
        self.clock.sleep(self.settings.record_delay).await;

        match outcome {
            Ok(payload) => {
                tracing::debug!("[{}] {}: ok", index + 1, record.name);
                BatchResult::success(index, batch_number, record, payload)
            }
            Err(failure) => {
                tracing::warn!("[{}] {}: {}", index + 1, record.name, failure);
                BatchResult::failure(index, batch_number, record, failure)
            }
        }
    }

    /// Saves the checkpoint and refreshes the reports; failures are logged
    fn persist(&mut self, ctx: &RunContext) {
        if let Err(e) = self.store.save(&ctx.checkpoint) {
            tracing::warn!("Failed to save checkpoint: {}", e);
        }
        if let Err(e) = self.reports.refresh(&ctx.results, &ctx.checkpoint) {
            tracing::warn!("Failed to refresh reports: {}", e);
        }
    }
}
