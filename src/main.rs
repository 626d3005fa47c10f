//! Query-Harvest main entry point
//!
//! This is the command-line interface for the Query-Harvest search harvester.

use anyhow::{bail, Context};
use clap::Parser;
use query_harvest::campaign::{
    build_variants, resume_point, CampaignController, CampaignSettings, Fetcher, PacingPolicy,
    QueryLimits, RetryPolicy, SearxClient, StalledPageHandler,
};
use query_harvest::config::{resolve_config, Config, ConfigOverrides};
use query_harvest::console::{confirm, prompt_seed, spawn_retry_listener};
use query_harvest::output::{load_statistics, print_run_summary, print_statistics};
use query_harvest::state::CampaignStatus;
use query_harvest::storage::{
    load_modifiers, CheckpointLabels, CheckpointRecord, CheckpointStore, CsvSink,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Query-Harvest: a resumable search-result harvester
///
/// Query-Harvest runs a seed query and each of its modifier variants against
/// a SearXNG-compatible backend, page by page, appending newly found
/// (title, URL) pairs to a CSV file. Press Ctrl+C to pause; the next run
/// resumes where this one stopped.
#[derive(Parser, Debug)]
#[command(name = "query-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable search-result harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Seed query (prompted for when omitted and not resuming)
    #[arg(long)]
    seed: Option<String>,

    /// Resume an interrupted campaign without asking
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Discard any saved checkpoint and start from the seed query
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Search endpoint URL
    #[arg(long, env = "SEARXNG_URL")]
    backend_url: Option<String>,

    /// New items to collect per query
    #[arg(long, env = "TOP_N_RESULTS_PER_QUERY")]
    quota: Option<usize>,

    /// Maximum pages to fetch per query
    #[arg(long, env = "MAX_PAGES_TO_FETCH_PER_QUERY")]
    max_pages: Option<u32>,

    /// Result CSV file
    #[arg(long, env = "OUTPUT_CSV_FILENAME")]
    output: Option<String>,

    /// Modifier terms file
    #[arg(long)]
    modifiers: Option<String>,

    /// Validate config and show the queries that would run, without searching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the result file and checkpoint, then exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend_url: self.backend_url.clone(),
            quota: self.quota,
            max_pages: self.max_pages,
            output: self.output.clone(),
            modifiers: self.modifiers.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let (config, config_hash) = resolve_config(cli.config.as_deref(), cli.overrides())
        .context("Failed to load configuration")?;
    match (&cli.config, &config_hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::info!("No configuration file given; using defaults"),
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, cli.seed.as_deref())?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_campaign(&cli, config, config_hash).await?;
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
            0 => EnvFilter::new("query_harvest=info,warn"),
            1 => EnvFilter::new("query_harvest=debug,info"),
            2 => EnvFilter::new("query_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the query plan
fn handle_dry_run(config: &Config, seed: Option<&str>) -> anyhow::Result<()> {
    println!("=== Query-Harvest Dry Run ===\n");

    println!("Backend:");
    println!("  URL: {}", config.backend.url);
    println!("  Request timeout: {}s", config.backend.request_timeout);
    println!(
        "  Search: language={}, categories={}, safesearch={}",
        config.search.language, config.search.categories, config.search.safesearch
    );

    println!("\nCampaign:");
    println!("  Quota per query: {}", config.campaign.quota);
    println!("  Max pages per query: {}", config.campaign.max_pages);
    println!("  Stalled-page pause: {}s", config.campaign.stall_pause);
    println!(
        "  Retry: {} attempts, backoff {}s..{}s (x{})",
        config.retry.attempts, config.retry.min_wait, config.retry.max_wait, config.retry.multiplier
    );
    println!(
        "  Pacing: {}s..{}s before each request",
        config.pacing.min_delay, config.pacing.max_delay
    );

    println!("\nOutput:");
    println!("  Results: {}", config.output.filename);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    let modifiers = load_modifiers(Path::new(&config.modifiers.path))
        .with_context(|| format!("Failed to read modifiers from {}", config.modifiers.path))?;
    let seed = seed.unwrap_or("<seed>");
    let variants = build_variants(seed, &modifiers);

    println!("\nQueries ({}):", variants.len());
    for (index, variant) in variants.iter().enumerate() {
        let marker = if variant.is_seed() { " (seed)" } else { "" };
        println!("  {}. {}{}", index + 1, variant.text, marker);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would run {} queries, at most {} requests",
        variants.len(),
        variants.len() as u64 * u64::from(config.campaign.max_pages)
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the result file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let stats = load_statistics(&config.output).context("Failed to load statistics")?;
    print_statistics(&stats);
    Ok(())
}

/// Decides whether to resume from a saved checkpoint
fn choose_resume(cli: &Cli, store: &CheckpointStore) -> anyhow::Result<Option<CheckpointRecord>> {
    if cli.fresh {
        if store.clear()? {
            tracing::info!("Discarded saved state in {}", store.path().display());
        }
        return Ok(None);
    }

    let Some(record) = store.load_or_discard() else {
        return Ok(None);
    };

    println!("Found saved state from a previous run in {}.", store.path().display());
    println!(
        "  Resuming from: Query='{}', Page={}",
        record.position.query_text, record.position.next_page
    );

    let resume = cli.resume
        || confirm(&mut io::stdin().lock(), &mut io::stdout(), "Do you want to resume?")?;

    if resume {
        Ok(Some(record))
    } else {
        store.clear()?;
        tracing::info!("Saved state discarded. Starting fresh.");
        Ok(None)
    }
}

/// Warns about inputs that changed since the checkpoint was written
///
/// Returns the output file to use, which is always the checkpoint's.
fn reconcile_labels(record: &CheckpointRecord, config: &Config, config_hash: Option<&str>) -> String {
    if record.modifier_file != config.modifiers.path {
        tracing::warn!(
            "Modifier file in state ({}) differs from current ({}).",
            record.modifier_file,
            config.modifiers.path
        );
    }

    if let (Some(saved), Some(current)) = (record.config_hash.as_deref(), config_hash) {
        if saved != current {
            tracing::warn!("Configuration changed since the checkpoint was saved.");
        }
    }

    if record.output_file != config.output.filename {
        tracing::warn!(
            "Output CSV file in state ({}) differs from current ({}). Resuming will use: {}",
            record.output_file,
            config.output.filename,
            record.output_file
        );
    }

    record.output_file.clone()
}

/// Handles the main campaign operation
async fn handle_campaign(
    cli: &Cli,
    config: Config,
    config_hash: Option<String>,
) -> anyhow::Result<()> {
    let store = CheckpointStore::new(&config.output.checkpoint_path);
    let resumed = choose_resume(cli, &store)?;

    let (seed, output_file) = match &resumed {
        Some(record) => {
            if let Some(seed) = cli.seed.as_deref() {
                if seed.trim() != record.position.seed_query {
                    tracing::warn!(
                        "Ignoring --seed \"{}\"; resuming seed query \"{}\"",
                        seed,
                        record.position.seed_query
                    );
                }
            }
            (
                record.position.seed_query.clone(),
                reconcile_labels(record, &config, config_hash.as_deref()),
            )
        }
        None => {
            let seed = match cli.seed.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(seed) => seed.to_string(),
                None => match prompt_seed(&mut io::stdin().lock(), &mut io::stdout())? {
                    Some(seed) => seed,
                    None => bail!("No seed query given"),
                },
            };
            (seed, config.output.filename.clone())
        }
    };

    let modifiers = load_modifiers(Path::new(&config.modifiers.path))
        .with_context(|| format!("Failed to read modifiers from {}", config.modifiers.path))?;

    let sink = CsvSink::open(
        &output_file,
        &config.output.title_column,
        &config.output.url_column,
    )
    .with_context(|| format!("Failed to open output file {}", output_file))?;

    let client = SearxClient::new(&config.backend, &config.search)?;
    let fetcher = Fetcher::new(
        client,
        RetryPolicy::from_config(&config.retry),
        PacingPolicy::from_config(&config.pacing),
    );

    let mut stall = StalledPageHandler::new(Duration::from_secs(config.campaign.stall_pause));
    if let Some(signal) = spawn_retry_listener() {
        stall = stall.with_retry_signal(signal);
    }
    if stall.is_attended() {
        tracing::info!("Retry listener active: type 'r' during a stalled-page pause to retry early");
    }

    let settings = CampaignSettings {
        limits: QueryLimits::from_config(&config.campaign),
        labels: CheckpointLabels {
            modifier_file: config.modifiers.path.clone(),
            output_file,
            config_hash,
        },
    };

    let mut controller =
        CampaignController::new(&seed, &modifiers, fetcher, stall, sink, store, settings);
    let start = resume_point(
        controller.variants(),
        resumed.as_ref().map(|record| &record.position),
    );

    let report = controller
        .run(start, shutdown_signal())
        .await
        .context("Campaign stopped on a fatal error")?;

    print_run_summary(&report);
    if report.status == CampaignStatus::Completed {
        tracing::info!("Campaign completed successfully");
    }

    Ok(())
}

/// Resolves on Ctrl+C
///
/// If the handler cannot be installed the future never resolves, so the
/// campaign simply runs to completion.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
