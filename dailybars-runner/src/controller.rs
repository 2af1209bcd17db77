//! Run controller: catalog → fetch → normalize → merge for every asset.
//!
//! One asset's failure never aborts the others. Assets are pulled on a
//! private bounded rayon pool; the provider paces and retries its own
//! requests, and the store serializes writes per asset file.

use crate::config::DEFAULT_WORKERS;
use crate::plan::{plan_window, FetchWindow};
use crate::progress::PullProgress;
use crate::summary::{AssetOutcome, ErrorKind, RunSummary};
use chrono::NaiveDate;
use dailybars_core::data::{AssetCatalog, DatasetStore, FetchError, MarketDataProvider, Normalizer};
use dailybars_core::domain::{Asset, OhlcRecord, PullRequest};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("asset discovery failed: {0}")]
    Discovery(#[source] FetchError),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Knobs for one run that do not belong to the pull request itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Last date of every window; the run date in artifacts.
    pub today: NaiveDate,
    pub workers: usize,
}

impl RunOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// Active assets to pull: the catalog's, or the provider's when the catalog
/// lists none. Duplicate symbols keep their first entry.
pub fn resolve_assets(
    catalog: &AssetCatalog,
    provider: &dyn MarketDataProvider,
) -> Result<Vec<Asset>, RunError> {
    if !catalog.is_empty() {
        return Ok(catalog.active_assets().into_iter().cloned().collect());
    }

    let discovered = provider.list_assets().map_err(RunError::Discovery)?;
    info!(
        "discovered {} assets from {}",
        discovered.len(),
        provider.name()
    );
    Ok(AssetCatalog::from_assets(discovered)
        .active_assets()
        .into_iter()
        .cloned()
        .collect())
}

/// Pull every asset and return the run summary.
///
/// - `cancel`: optional flag; once set, assets not yet started are reported
///   as cancelled
///
/// Per-asset problems end up in the summary; only setup errors are returned.
pub fn run_pull(
    request: &PullRequest,
    assets: &[Asset],
    provider: &dyn MarketDataProvider,
    store: &DatasetStore,
    options: &RunOptions,
    progress: &dyn PullProgress,
    cancel: Option<&AtomicBool>,
) -> Result<RunSummary, RunError> {
    let mut seen = HashSet::new();
    let assets: Vec<&Asset> = assets
        .iter()
        .filter(|a| a.active && seen.insert(a.symbol.as_str()))
        .collect();
    let total = assets.len();

    info!(
        mode = request.mode().as_str(),
        days_back = request.days_back(),
        today = %options.today,
        "pulling {total} assets from {} with {} workers",
        provider.name(),
        options.workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()
        .map_err(|e| RunError::WorkerPool(e.to_string()))?;

    let outcomes: Vec<AssetOutcome> = pool.install(|| {
        assets
            .par_iter()
            .enumerate()
            .map(|(index, asset)| {
                if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                    let outcome = AssetOutcome::cancelled(&asset.symbol);
                    progress.on_complete(&outcome, index, total);
                    return outcome;
                }

                progress.on_start(&asset.symbol, index, total);
                let outcome = pull_asset(request, asset, provider, store, options.today);
                progress.on_complete(&outcome, index, total);
                outcome
            })
            .collect()
    });

    let summary = RunSummary::new(request, options.today, provider.name(), outcomes);
    progress.on_batch_complete(&summary);
    Ok(summary)
}

/// Plan, fetch, normalize and merge one asset.
fn pull_asset(
    request: &PullRequest,
    asset: &Asset,
    provider: &dyn MarketDataProvider,
    store: &DatasetStore,
    today: NaiveDate,
) -> AssetOutcome {
    let symbol = asset.symbol.as_str();

    let last_stored = match store.last_date(symbol) {
        Ok(last) => last,
        Err(e) => return AssetOutcome::failed(symbol, None, ErrorKind::Storage, e.to_string()),
    };
    let window = plan_window(request, today, provider.earliest_available(asset), last_stored);

    if !provider.is_available() {
        return AssetOutcome::from_fetch_error(symbol, window, &FetchError::CircuitOpen);
    }

    debug!(
        reason = ?window.reason,
        "{symbol}: fetching {} to {} ({} days)",
        window.start,
        window.end,
        window.days()
    );
    let fetched = match provider.fetch_daily(asset, window.start, window.end) {
        Ok(fetched) => fetched,
        Err(e) => return AssetOutcome::from_fetch_error(symbol, window, &e),
    };

    let records = match Normalizer::normalize_batch(symbol, &fetched.candles) {
        Ok(records) => records,
        Err(e) => {
            return AssetOutcome::skipped(
                symbol,
                Some(window),
                ErrorKind::InvalidRecord,
                e.to_string(),
            )
        }
    };

    let records = in_window(records, &window);
    match store.merge(symbol, &records) {
        Ok(report) => AssetOutcome::succeeded(symbol, window, report),
        Err(e) => AssetOutcome::failed(symbol, Some(window), ErrorKind::Storage, e.to_string()),
    }
}

/// Drop records the provider returned outside the planned window.
fn in_window(records: Vec<OhlcRecord>, window: &FetchWindow) -> Vec<OhlcRecord> {
    let fetched = records.len();
    let kept: Vec<_> = records
        .into_iter()
        .filter(|r| window.contains(r.date))
        .collect();
    if kept.len() < fetched {
        debug!(
            "dropped {} records outside {}..={}",
            fetched - kept.len(),
            window.start,
            window.end
        );
    }
    kept
}
