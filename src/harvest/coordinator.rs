//! Harvest coordinator: orchestration of both phases
//!
//! - `enumerate_urls` walks the listing and keeps the manifest on disk up to
//!   date, resuming after the last page it already holds
//! - `fetch_content` runs the manifest's records through the batch runner in
//!   a new or resumed run directory
//! - `export_report` and `run_statistics` read a run directory back

use crate::batch::{BatchRunner, RunContext, RunnerSettings};
use crate::clock::Clock;
use crate::config::Config;
use crate::driver::{ListingDriver, Navigator};
use crate::enumerator::{EnumeratedItem, ListingSettings, PageEnumerator};
use crate::fetch::{build_http_client, ContentExtractor, HttpProcessor, RecordProcessor};
use crate::model::{ResultLog, UrlRecord};
use crate::output::{
    load_batch_results, load_statistics, BatchArtifactWriter, ReportGenerator, RunStatistics,
};
use crate::resolver::{RedirectResolver, ResolverSettings};
use crate::storage::{
    find_resumable_run, new_run_dir, CheckpointState, CheckpointStore, JsonCheckpointStore,
    Manifest,
};
use crate::{Result, WaymarkError};
use chrono::Utc;
use std::path::Path;

/// Loads the manifest to resume from, unless a fresh start is requested
fn existing_manifest(path: &Path, fresh: bool) -> Option<Manifest> {
    if fresh {
        tracing::info!("Fresh start requested, ignoring {}", path.display());
        return None;
    }
    match Manifest::load(path) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!("Manifest {} is unreadable, starting over: {}", path.display(), e);
            None
        }
    }
}

/// Enumerates the listing and writes the manifest
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `listing` - Driver for the listing tab
/// * `navigator` - Dedicated handle for redirect resolution
/// * `clock` - Source of every delay
/// * `fresh` - Ignore an existing manifest
///
/// # Returns
///
/// The manifest as saved at the end. Page-level failures are logged and
/// trigger an extra save; they do not fail the phase. A walk that could not
/// reach the end of the listing leaves the manifest marked incomplete.
pub async fn enumerate_urls<L, N, C>(
    config: &Config,
    listing: L,
    navigator: N,
    clock: C,
    fresh: bool,
) -> Result<Manifest>
where
    L: ListingDriver,
    N: Navigator,
    C: Clock + Clone,
{
    let path = Path::new(&config.output.manifest_path);
    let mut manifest = existing_manifest(path, fresh).unwrap_or_else(|| Manifest::new(Utc::now()));

    let start_page = match manifest.last_page() {
        Some(last) => {
            tracing::info!(
                "Manifest holds {} records up to page {}, resuming at page {}",
                manifest.len(),
                last,
                last + 1
            );
            last + 1
        }
        None => 1,
    };

    let resolver = RedirectResolver::new(
        navigator,
        clock.clone(),
        ResolverSettings::from_config(&config.resolver),
    );
    let mut enumerator = PageEnumerator::starting_at(
        listing,
        resolver,
        clock,
        ListingSettings::from_config(&config.listing),
        start_page,
    );

    let save_every = config.listing.save_every_pages.max(1);
    let mut pages_since_save = 0;

    while let Some(item) = enumerator.next_item().await {
        match item {
            EnumeratedItem::Record(record) => manifest.push(record),
            EnumeratedItem::PageDone {
                page,
                rows,
                error: None,
            } => {
                tracing::info!(
                    "Page {} done ({} rows, {} records total)",
                    page,
                    rows,
                    manifest.len()
                );
                pages_since_save += 1;
                if pages_since_save >= save_every {
                    save_manifest(&mut manifest, path, false);
                    pages_since_save = 0;
                }
            }
            EnumeratedItem::PageDone {
                page,
                error: Some(error),
                ..
            } => {
                tracing::error!("Page {} failed: {}", page, error);
                save_manifest(&mut manifest, path, false);
                pages_since_save = 0;
            }
        }
    }

    let complete = match enumerator.abort_reason() {
        Some(reason) => {
            tracing::error!("Enumeration stopped early: {}", reason);
            false
        }
        None => true,
    };
    manifest.save(path, Utc::now(), complete)?;
    tracing::info!(
        "Enumeration {}: {} records, {} with a usable URL ({})",
        if complete { "finished" } else { "incomplete" },
        manifest.metadata.total_count,
        manifest.metadata.success_count,
        manifest.statistics.success_rate
    );
    Ok(manifest)
}

fn save_manifest(manifest: &mut Manifest, path: &Path, complete: bool) {
    if let Err(e) = manifest.save(path, Utc::now(), complete) {
        tracing::warn!("Failed to save manifest {}: {}", path.display(), e);
    }
}

/// Reads the records of the manifest at `path`
pub fn load_manifest_records(path: &Path) -> Result<Vec<UrlRecord>> {
    match Manifest::load(path)? {
        Some(manifest) => Ok(manifest.urls),
        None => Err(WaymarkError::MissingManifest(path.display().to_string())),
    }
}

/// Picks the run to continue, or creates a new one
///
/// An incomplete run is resumed only when its checkpoint covers the same
/// number of records.
pub fn prepare_run(
    config: &Config,
    config_hash: Option<String>,
    total: usize,
    fresh: bool,
) -> Result<RunContext> {
    let root = Path::new(&config.output.runs_root);
    let batch_size = config.batch.batch_size;

    if !fresh {
        if let Some((dir, checkpoint)) = find_resumable_run(root)? {
            if checkpoint.total_count == total {
                if checkpoint.config_hash.is_some() && checkpoint.config_hash != config_hash {
                    tracing::warn!("Configuration changed since {} was started", dir.display());
                }
                tracing::info!(
                    "Resuming {} at {}/{}",
                    dir.display(),
                    checkpoint.processed_count,
                    checkpoint.total_count
                );
                let results = ResultLog::from_results(load_batch_results(&dir));
                return Ok(RunContext::resume(&dir, checkpoint, results, batch_size));
            }
            tracing::warn!(
                "Run {} covers {} records but the manifest has {}; starting a new run",
                dir.display(),
                checkpoint.total_count,
                total
            );
        }
    }

    let now = Utc::now();
    let dir = new_run_dir(root, now)?;
    Ok(RunContext::fresh(&dir, total, batch_size, config_hash, now))
}

/// Fetches every record in checkpointed batches
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `ctx` - Run context from [`prepare_run`]
/// * `records` - The manifest's records
/// * `processor` - Content fetcher
/// * `clock` - Source of every delay
pub async fn fetch_content<P, C>(
    config: &Config,
    ctx: &mut RunContext,
    records: &[UrlRecord],
    processor: &mut P,
    clock: C,
) -> Result<()>
where
    P: RecordProcessor,
    C: Clock,
{
    let run_dir = ctx.run_dir.clone();
    let store = JsonCheckpointStore::new(&run_dir).pinned(ctx.checkpoint.start_time);

    let mut runner = BatchRunner::new(
        store,
        BatchArtifactWriter::new(&run_dir),
        ReportGenerator::new(&run_dir, Some(ctx.batch_size)),
        clock,
        RunnerSettings::from_config(&config.batch),
    );

    runner.run(records, ctx, processor).await?;
    tracing::info!("Reports written to {}", run_dir.display());
    Ok(())
}

/// HTTP fetcher built from the `[fetch]` section
pub fn http_processor(config: &Config) -> Result<HttpProcessor> {
    let client = build_http_client(&config.fetch)?;
    let extractor = ContentExtractor::new(&config.fetch.content_selector)?;
    Ok(HttpProcessor::new(client, extractor))
}

fn load_checkpoint(run_dir: &Path) -> Result<CheckpointState> {
    JsonCheckpointStore::new(run_dir)
        .load()
        .ok_or_else(|| WaymarkError::MissingCheckpoint(run_dir.display().to_string()))
}

/// Re-renders both reports of a run from its checkpoint and batch results
pub fn export_report(run_dir: &Path) -> Result<()> {
    let checkpoint = load_checkpoint(run_dir)?;
    let results = ResultLog::from_results(load_batch_results(run_dir));

    ReportGenerator::new(run_dir, checkpoint.batch_size).refresh_at(
        &results,
        &checkpoint,
        Utc::now(),
    )?;
    tracing::info!("Exported reports for {}", run_dir.display());
    Ok(())
}

/// Statistics of a run directory
pub fn run_statistics(run_dir: &Path) -> Result<RunStatistics> {
    let checkpoint = load_checkpoint(run_dir)?;
    let results = ResultLog::from_results(load_batch_results(run_dir));
    Ok(load_statistics(&checkpoint, &results))
}
