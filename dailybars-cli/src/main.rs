//! dailybars CLI: pull daily OHLC data into per-asset CSV datasets.
//!
//! Commands:
//! - `pull`: incremental or full historical pull for every active asset
//! - `assets`: show the configured catalog, or discover it from the provider
//! - `status`: report stored datasets and the last run summary
//!
//! `pull` exits non-zero only when no asset could be pulled at all.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use dailybars_core::data::{
    AssetCatalog, DatasetStore, HyperliquidProvider, MarketDataProvider, MergePolicy,
};
use dailybars_core::domain::Asset;
use dailybars_runner::{
    record_run, resolve_assets, run_pull, AssetManifest, Invocation, LogProgress, PipelineConfig,
    RunOptions, RunSummary,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dailybars",
    version,
    about = "Daily OHLC ingestion into version-controlled CSV datasets"
)]
struct Cli {
    /// Pipeline config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset directory. Overrides `data_dir` from the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull daily candles and merge them into the datasets.
    Pull {
        /// Pull each asset's whole available history.
        #[arg(long, default_value_t = false)]
        full_historical: bool,

        /// Days to re-pull in incremental mode (today included). Defaults to
        /// $DAYS_BACK, then 1.
        #[arg(long)]
        days_back: Option<u32>,

        /// Pull only these symbols instead of the catalog.
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Worker threads. Overrides `workers` from the config.
        #[arg(long)]
        workers: Option<usize>,

        /// What to do with re-pulled days that are already stored.
        #[arg(long, value_enum)]
        merge_policy: Option<MergeArg>,

        /// Run date (YYYY-MM-DD). Defaults to the current UTC date.
        #[arg(long)]
        today: Option<String>,

        /// Skip writing assets.json and last_run_summary.json.
        #[arg(long, default_value_t = false)]
        no_artifacts: bool,
    },
    /// Show the asset catalog.
    Assets {
        /// Ask the provider for its current universe.
        #[arg(long, default_value_t = false)]
        discover: bool,

        /// Print as a TOML `[[assets]]` block for the config file.
        #[arg(long, default_value_t = false)]
        toml: bool,
    },
    /// Report stored datasets and the last run.
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum MergeArg {
    Overwrite,
    KeepExisting,
}

impl From<MergeArg> for MergePolicy {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::Overwrite => MergePolicy::Overwrite,
            MergeArg::KeepExisting => MergePolicy::KeepExisting,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Pull {
            full_historical,
            days_back,
            symbols,
            workers,
            merge_policy,
            today,
            no_artifacts,
        } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if let Some(policy) = merge_policy {
                config.merge_policy = policy.into();
            }
            config.validate()?;

            let mut invocation = Invocation::from_env()?;
            if full_historical {
                invocation.full_historical = true;
            }
            if let Some(days) = days_back {
                invocation.days_back = days;
            }

            let today = match today.as_deref() {
                Some(s) => parse_date(s)?,
                None => chrono::Utc::now().date_naive(),
            };

            let code = run_pull_cmd(&config, invocation, &symbols, today, !no_artifacts)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Assets { discover, toml } => run_assets(&config, discover, toml),
        Commands::Status => run_status(&config.dataset_store()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date {s:?}"))
}

fn provider(config: &PipelineConfig) -> Result<HyperliquidProvider> {
    let breaker = Arc::new(config.circuit_breaker());
    HyperliquidProvider::new(config.hyperliquid_config(), breaker)
        .context("creating Hyperliquid client")
}

fn run_pull_cmd(
    config: &PipelineConfig,
    invocation: Invocation,
    symbols: &[String],
    today: NaiveDate,
    write_artifacts: bool,
) -> Result<i32> {
    let request = invocation.to_request()?;
    ensure_dir(&config.data_dir)?;
    let provider = provider(config)?;
    let store = config.dataset_store();

    let catalog = if symbols.is_empty() {
        config.catalog()
    } else {
        AssetCatalog::from_assets(symbols.iter().map(Asset::new).collect())
    };
    let assets = resolve_assets(&catalog, &provider)?;
    if assets.is_empty() {
        warn!("no active assets to pull");
    }

    let options = RunOptions::new(today).with_workers(config.workers);
    let cancel = cancel_on_ctrl_c();
    let summary = run_pull(
        &request,
        &assets,
        &provider,
        &store,
        &options,
        &LogProgress,
        Some(&cancel),
    )?;

    if summary.is_total_failure() {
        error!(
            "no asset was pulled successfully ({} skipped, {} failed, {} cancelled)",
            summary.skipped, summary.failed, summary.cancelled
        );
    } else if summary.changed == 0 {
        info!("no new data");
    }

    if write_artifacts {
        let catalog_symbols: Vec<&str> = assets.iter().map(|a| a.symbol.as_str()).collect();
        return Ok(record_run(&summary, &store, &catalog_symbols));
    }
    Ok(summary.exit_code())
}

/// Flag raised by the first Ctrl-C: assets already started finish and are
/// merged, the rest are reported as cancelled. A second Ctrl-C exits at once.
fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let watcher = thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Ctrl-C handling unavailable: {e}");
                    return;
                }
            };
            if runtime.block_on(tokio::signal::ctrl_c()).is_err() {
                return;
            }
            warn!("interrupted: finishing started assets, cancelling the rest");
            flag.store(true, Ordering::Relaxed);

            if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
                std::process::exit(130);
            }
        });
    if let Err(e) = watcher {
        warn!("Ctrl-C handling unavailable: {e}");
    }
    cancel
}

fn run_assets(config: &PipelineConfig, discover: bool, as_toml: bool) -> Result<()> {
    let catalog = if discover {
        let provider = provider(config)?;
        let listed = provider
            .list_assets()
            .with_context(|| format!("listing assets from {}", provider.name()))?;
        AssetCatalog::from_assets(listed)
    } else {
        config.catalog()
    };

    if catalog.is_empty() {
        println!("No assets configured; `pull` will discover them from the provider.");
        return Ok(());
    }

    if as_toml {
        print!("{}", catalog.to_toml()?);
        return Ok(());
    }

    let active = catalog.active_assets().len();
    println!("Assets: {} ({active} active)", catalog.len());
    println!();
    println!("{:<12} {:<14} {:<8}", "Symbol", "Venue", "Active");
    println!("{}", "-".repeat(36));
    for asset in &catalog.assets {
        println!(
            "{:<12} {:<14} {:<8}",
            asset.symbol,
            asset.venue,
            if asset.active { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn run_status(store: &DatasetStore) -> Result<()> {
    let dir = store.root();
    if !dir.exists() {
        println!("Data directory does not exist: {}", dir.display());
        return Ok(());
    }
    ensure_dir(dir)?;

    let symbols = store.list_symbols()?;
    if symbols.is_empty() {
        println!("No datasets in {}", dir.display());
    } else {
        print_datasets(store, &symbols)?;
    }

    if let Some(manifest) = AssetManifest::read(dir)? {
        let missing = manifest.total_assets.saturating_sub(manifest.datasets.len());
        if missing > 0 {
            println!("{missing} catalog assets have no dataset yet");
        }
    }

    match RunSummary::read(dir)? {
        Some(last) => {
            println!();
            println!(
                "Last run: {} ({}, days_back {}) via {}",
                last.run_date,
                last.mode.as_str(),
                last.days_back,
                last.provider
            );
            println!(
                "  {} succeeded ({} changed, +{} records), {} skipped, {} failed, {} cancelled",
                last.succeeded,
                last.changed,
                last.records_added,
                last.skipped,
                last.failed,
                last.cancelled
            );
        }
        None => println!("No run summary in {}", dir.display()),
    }
    Ok(())
}

fn print_datasets(store: &DatasetStore, symbols: &[String]) -> Result<()> {
    println!("Data directory: {}", store.root().display());
    println!("Datasets: {}", symbols.len());
    println!();
    println!(
        "{:<12} {:<25} {:>8} {:<16}",
        "Symbol", "Date Range", "Rows", "Hash"
    );
    println!("{}", "-".repeat(64));
    for symbol in symbols {
        match store.stats(symbol)? {
            Some(stats) => println!(
                "{:<12} {:<25} {:>8} {:<16}",
                stats.symbol,
                format!("{} to {}", stats.first_date, stats.last_date),
                stats.rows,
                short_hash(&stats.data_hash)
            ),
            None => println!("{symbol:<12} (empty)"),
        }
    }
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        bail!("{} is not a directory", path.display());
    }
    Ok(())
}
