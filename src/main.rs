//! Waymark main entry point
//!
//! This is the command-line interface for the Waymark harvester.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use waymark::batch::BatchPlan;
use waymark::clock::TokioClock;
use waymark::config::{load_config_with_hash, validate, Config, FetchMode};
use waymark::harvest::{self, Phase};
use waymark::output::print_statistics;
use waymark::storage::find_resumable_run;

/// Waymark: a resumable redirect-resolving harvester
///
/// Waymark walks a paginated listing, resolves every row's link through its
/// redirect chain, and fetches the content behind each final URL in
/// checkpointed batches that survive interruption.
#[derive(Parser, Debug)]
#[command(name = "waymark")]
#[command(version = "1.0.0")]
#[command(about = "A resumable redirect-resolving harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the listing URL
    #[arg(long, value_name = "URL")]
    target_url: Option<String>,

    /// Override the number of listing pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the number of records per batch
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Which phase to run
    #[arg(long, value_enum, default_value_t = PhaseArg::All)]
    phase: PhaseArg,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume the manifest and the newest incomplete run (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start over, ignoring the manifest and previous runs
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be done without doing it
    #[arg(long, conflicts_with_all = ["stats", "export_report"])]
    dry_run: bool,

    /// Show statistics of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_report"])]
    stats: bool,

    /// Re-render the reports of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_report: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PhaseArg {
    Enumerate,
    Fetch,
    All,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Enumerate => Phase::Enumerate,
            PhaseArg::Fetch => Phase::Fetch,
            PhaseArg::All => Phase::All,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config, cli.phase.into(), cli.fresh)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_report {
        handle_export_report(&config)?;
    } else {
        handle_harvest(&config, config_hash, cli.phase.into(), cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("waymark=info,warn"),
            1 => EnvFilter::new("waymark=debug,info"),
            2 => EnvFilter::new("waymark=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.target_url {
        config.listing.target_url = url.clone();
    }
    if let Some(pages) = cli.max_pages {
        config.listing.max_pages = pages;
    }
    if let Some(size) = cli.batch_size {
        config.batch.batch_size = size;
    }
}

/// Handles the --dry-run mode: validates config and shows the plan
fn handle_dry_run(config: &Config, phase: Phase, fresh: bool) -> anyhow::Result<()> {
    println!("=== Waymark Dry Run ===\n");

    println!("Listing:");
    println!("  Target: {}", config.listing.target_url);
    println!("  Max pages: {}", config.listing.max_pages);
    println!("  Rows: {}", config.listing.row_selector);
    println!("  Next: {}", config.listing.next_selector);

    println!("\nResolver:");
    println!(
        "  Poll window: {}s every {}ms",
        config.resolver.max_wait_seconds, config.resolver.poll_interval_ms
    );

    println!("\nFetch:");
    println!("  Mode: {:?}", config.fetch.mode);
    println!("  Content: {}", config.fetch.content_selector);
    println!("  Batch size: {}", config.batch.batch_size);

    println!("\nOutput:");
    println!("  Manifest: {}", config.output.manifest_path);
    println!("  Runs: {}", config.output.runs_root);

    let manifest_path = Path::new(&config.output.manifest_path);
    if phase.fetches() {
        match harvest::load_manifest_records(manifest_path) {
            Ok(records) => {
                let plan = BatchPlan::new(records.len(), config.batch.batch_size)?;
                let resume = if fresh {
                    None
                } else {
                    find_resumable_run(Path::new(&config.output.runs_root))?
                        .filter(|(_, checkpoint)| checkpoint.total_count == records.len())
                };
                println!(
                    "\n✓ Manifest has {} records in {} batches",
                    records.len(),
                    plan.batch_count()
                );
                match resume {
                    Some((dir, checkpoint)) => println!(
                        "✓ Would resume {} at record {}",
                        dir.display(),
                        checkpoint.processed_count + 1
                    ),
                    None => println!("✓ Would start a new run"),
                }
            }
            Err(e) => println!("\n! {}", e),
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics of the latest run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let run_dir = harvest::latest_run(Path::new(&config.output.runs_root))?;
    println!("Run: {}\n", run_dir.display());

    let stats = harvest::run_statistics(&run_dir)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-report mode: re-renders the latest run's reports
fn handle_export_report(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Harvest Reports ===\n");

    let run_dir = harvest::latest_run(Path::new(&config.output.runs_root))?;
    println!("Run: {}", run_dir.display());

    harvest::export_report(&run_dir)?;
    println!("✓ Reports exported to: {}", run_dir.display());

    Ok(())
}

/// Handles the harvest itself: enumeration, fetching, or both
async fn handle_harvest(
    config: &Config,
    config_hash: String,
    phase: Phase,
    fresh: bool,
) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh (ignoring previous state)");
    } else {
        tracing::info!("Starting (will resume previous state if any)");
    }

    if phase.enumerates() {
        run_enumeration(config, fresh).await?;
    }

    if phase.fetches() {
        let records = harvest::load_manifest_records(Path::new(&config.output.manifest_path))?;
        // A fresh enumeration implies a fresh fetch run
        let mut ctx = harvest::prepare_run(config, Some(config_hash), records.len(), fresh)?;
        tracing::info!("Run directory: {}", ctx.run_dir.display());

        match config.fetch.mode {
            FetchMode::Http => {
                let mut processor = harvest::http_processor(config)?;
                harvest::fetch_content(config, &mut ctx, &records, &mut processor, TokioClock)
                    .await?;
            }
            FetchMode::Browser => run_browser_fetch(config, &mut ctx, &records).await?,
        }

        tracing::info!(
            "Fetch finished: {}/{} processed, {} succeeded, {} failed",
            ctx.checkpoint.processed_count,
            ctx.checkpoint.total_count,
            ctx.checkpoint.success_count,
            ctx.checkpoint.fail_count
        );
    }

    Ok(())
}

#[cfg(feature = "browser")]
async fn run_enumeration(config: &Config, fresh: bool) -> anyhow::Result<()> {
    let manifest = harvest::enumerate_with_browser(config, fresh).await?;
    println!(
        "✓ {} URLs in {} ({} resolved)",
        manifest.metadata.total_count,
        config.output.manifest_path,
        manifest.metadata.success_count
    );
    Ok(())
}

#[cfg(not(feature = "browser"))]
async fn run_enumeration(_config: &Config, _fresh: bool) -> anyhow::Result<()> {
    anyhow::bail!("enumeration needs a browser; rebuild with the `browser` feature")
}

#[cfg(feature = "browser")]
async fn run_browser_fetch(
    config: &Config,
    ctx: &mut waymark::RunContext,
    records: &[waymark::UrlRecord],
) -> anyhow::Result<()> {
    harvest::fetch_with_browser(config, ctx, records).await?;
    Ok(())
}

#[cfg(not(feature = "browser"))]
async fn run_browser_fetch(
    _config: &Config,
    _ctx: &mut waymark::RunContext,
    _records: &[waymark::UrlRecord],
) -> anyhow::Result<()> {
    anyhow::bail!("fetch mode \"browser\" needs the `browser` feature")
}
