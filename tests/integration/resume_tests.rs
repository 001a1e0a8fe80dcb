//! Interrupting and resuming a fetch run

use crate::common::{record, test_config, EchoProcessor};
use std::time::Duration;
use tempfile::TempDir;
use waymark::clock::VirtualClock;
use waymark::fetch::RecordProcessor;
use waymark::harvest;
use waymark::model::{Payload, RecordFailure};
use waymark::storage::CheckpointStore;
use waymark::{JsonCheckpointStore, UrlRecord};

/// Processor that stops responding after `limit` records, like a killed process
struct StallingProcessor {
    inner: EchoProcessor,
    limit: usize,
}

impl RecordProcessor for StallingProcessor {
    async fn process(&mut self, url: &str, record: &UrlRecord) -> Result<Payload, RecordFailure> {
        if self.inner.seen.len() == self.limit {
            std::future::pending::<()>().await;
        }
        self.inner.process(url, record).await
    }
}

fn records(count: usize) -> Vec<UrlRecord> {
    (1..=count)
        .map(|n| record(n, &format!("https://site.test/item/{}", n)))
        .collect()
}

/// Runs until the processor stalls on its `limit + 1`-th record
async fn interrupted_run(config: &waymark::Config, records: &[UrlRecord], limit: usize) {
    let mut ctx = harvest::prepare_run(config, None, records.len(), false).unwrap();
    let mut processor = StallingProcessor {
        inner: EchoProcessor::default(),
        limit,
    };
    let run = harvest::fetch_content(config, &mut ctx, records, &mut processor, VirtualClock::new());
    assert!(
        tokio::time::timeout(Duration::from_millis(500), run)
            .await
            .is_err(),
        "Run should have stalled"
    );
}

#[tokio::test]
async fn test_interrupted_run_keeps_last_completed_batch() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let records = records(12);

    // Stalls in the middle of batch 2
    interrupted_run(&config, &records, 7).await;

    let run_dir = harvest::latest_run(temp.path().join("runs").as_path()).unwrap();
    let checkpoint = JsonCheckpointStore::new(&run_dir)
        .load()
        .expect("Checkpoint should exist after the first batch");
    assert_eq!(checkpoint.processed_count, 5);
    assert_eq!(checkpoint.total_count, 12);
    assert!(!checkpoint.is_completed);
    assert!(checkpoint.end_time.is_none());
}

#[tokio::test]
async fn test_resume_processes_only_remaining_records() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let records = records(12);

    interrupted_run(&config, &records, 7).await;
    let first_dir = harvest::latest_run(temp.path().join("runs").as_path()).unwrap();

    let mut ctx = harvest::prepare_run(&config, None, records.len(), false).unwrap();
    assert_eq!(ctx.run_dir, first_dir);
    assert_eq!(ctx.resume_offset(), 5);
    assert_eq!(ctx.results.len(), 5);

    let mut processor = EchoProcessor::default();
    harvest::fetch_content(&config, &mut ctx, &records, &mut processor, VirtualClock::new())
        .await
        .unwrap();

    let expected: Vec<String> = (6..=12)
        .map(|n| format!("https://site.test/item/{}", n))
        .collect();
    assert_eq!(processor.seen, expected);

    assert!(ctx.checkpoint.is_completed);
    assert_eq!(ctx.checkpoint.processed_count, 12);
    assert_eq!(ctx.checkpoint.success_count, 12);
    assert_eq!(ctx.results.len(), 12);
}

#[tokio::test]
async fn test_resumed_totals_match_uninterrupted_run() {
    let resumed_root = TempDir::new().unwrap();
    let clean_root = TempDir::new().unwrap();
    let records = records(12);

    let config = test_config(resumed_root.path(), 5);
    interrupted_run(&config, &records, 10).await;
    let mut resumed = harvest::prepare_run(&config, None, records.len(), false).unwrap();
    harvest::fetch_content(
        &config,
        &mut resumed,
        &records,
        &mut EchoProcessor::default(),
        VirtualClock::new(),
    )
    .await
    .unwrap();

    let config = test_config(clean_root.path(), 5);
    let mut clean = harvest::prepare_run(&config, None, records.len(), false).unwrap();
    harvest::fetch_content(
        &config,
        &mut clean,
        &records,
        &mut EchoProcessor::default(),
        VirtualClock::new(),
    )
    .await
    .unwrap();

    assert_eq!(resumed.checkpoint.processed_count, clean.checkpoint.processed_count);
    assert_eq!(resumed.checkpoint.success_count, clean.checkpoint.success_count);
    assert_eq!(resumed.checkpoint.fail_count, clean.checkpoint.fail_count);
    let indices = |ctx: &waymark::RunContext| -> Vec<(usize, usize)> {
        ctx.results
            .iter()
            .map(|r| (r.record_index, r.batch_number))
            .collect()
    };
    assert_eq!(indices(&resumed), indices(&clean));
}

#[tokio::test]
async fn test_completed_run_is_not_resumed() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let records = records(3);

    let mut first = harvest::prepare_run(&config, None, records.len(), false).unwrap();
    harvest::fetch_content(
        &config,
        &mut first,
        &records,
        &mut EchoProcessor::default(),
        VirtualClock::new(),
    )
    .await
    .unwrap();

    let second = harvest::prepare_run(&config, None, records.len(), false).unwrap();
    assert_ne!(second.run_dir, first.run_dir);
    assert_eq!(second.resume_offset(), 0);
}

#[tokio::test]
async fn test_fresh_ignores_incomplete_run() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let records = records(12);

    interrupted_run(&config, &records, 7).await;
    let interrupted = harvest::latest_run(temp.path().join("runs").as_path()).unwrap();

    let ctx = harvest::prepare_run(&config, None, records.len(), true).unwrap();
    assert_ne!(ctx.run_dir, interrupted);
    assert_eq!(ctx.resume_offset(), 0);
    assert!(ctx.results.is_empty());
}

#[tokio::test]
async fn test_manifest_size_change_starts_new_run() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path(), 5);
    let records = records(12);

    interrupted_run(&config, &records, 7).await;
    let interrupted = harvest::latest_run(temp.path().join("runs").as_path()).unwrap();

    let ctx = harvest::prepare_run(&config, None, 20, false).unwrap();
    assert_ne!(ctx.run_dir, interrupted);
    assert_eq!(ctx.checkpoint.total_count, 20);
}
