//! Per-asset outcomes, the run summary, and the JSON run artifacts.
//!
//! Artifacts live next to the datasets:
//! - `last_run_summary.json`: run date, mode, per-asset outcomes, counts
//! - `assets.json`: catalog symbols plus row count, date range and BLAKE3
//!   hash of every dataset file
//!
//! Neither holds wall-clock time. `assets.json` depends only on the datasets,
//! so it is byte-identical whenever they are. `last_run_summary.json` records
//! what the run did: after a run that changed data, a repeat of the same
//! request reports `unchanged` outcomes and rewrites it once, and every
//! further repeat leaves it byte-identical.

use crate::plan::FetchWindow;
use chrono::NaiveDate;
use dailybars_core::data::store::write_atomic;
use dailybars_core::data::{DatasetStats, DatasetStore, FetchError, MergeReport, StoreError, WriteOutcome};
use dailybars_core::domain::{PullMode, PullRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::error;

pub const SUMMARY_FILE: &str = "last_run_summary.json";
pub const MANIFEST_FILE: &str = "assets.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Dataset merged (possibly with nothing new).
    Succeeded,
    /// Logged and skipped: not found, auth, malformed or invalid data.
    Skipped,
    /// Retries exhausted, circuit open, or the write failed.
    Failed,
    /// Never started because the run was cancelled.
    Cancelled,
}

/// Error class behind a skipped or failed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Auth,
    MalformedResponse,
    InvalidRecord,
    RateLimited,
    TransientNetwork,
    CircuitOpen,
    Storage,
}

impl From<&FetchError> for ErrorKind {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::RateLimited { .. } => ErrorKind::RateLimited,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::TransientNetwork(_) => ErrorKind::TransientNetwork,
            FetchError::Auth(_) => ErrorKind::Auth,
            FetchError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            FetchError::CircuitOpen => ErrorKind::CircuitOpen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOutcome {
    pub symbol: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<FetchWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AssetOutcome {
    pub fn succeeded(symbol: &str, window: FetchWindow, report: MergeReport) -> Self {
        Self {
            symbol: symbol.to_string(),
            status: OutcomeStatus::Succeeded,
            window: Some(window),
            merge: Some(report),
            error_kind: None,
            message: None,
        }
    }

    pub fn skipped(
        symbol: &str,
        window: Option<FetchWindow>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::errored(symbol, OutcomeStatus::Skipped, window, kind, message.into())
    }

    pub fn failed(
        symbol: &str,
        window: Option<FetchWindow>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::errored(symbol, OutcomeStatus::Failed, window, kind, message.into())
    }

    /// Skip or fail according to the fetch error's class.
    pub fn from_fetch_error(symbol: &str, window: FetchWindow, err: &FetchError) -> Self {
        let kind = ErrorKind::from(err);
        if err.is_skippable() {
            Self::skipped(symbol, Some(window), kind, err.to_string())
        } else {
            Self::failed(symbol, Some(window), kind, err.to_string())
        }
    }

    pub fn cancelled(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            status: OutcomeStatus::Cancelled,
            window: None,
            merge: None,
            error_kind: None,
            message: None,
        }
    }

    fn errored(
        symbol: &str,
        status: OutcomeStatus,
        window: Option<FetchWindow>,
        kind: ErrorKind,
        message: String,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            status,
            window,
            merge: None,
            error_kind: Some(kind),
            message: Some(message),
        }
    }

    /// Whether the dataset file was created or rewritten.
    pub fn changed(&self) -> bool {
        self.merge
            .as_ref()
            .is_some_and(|m| m.outcome != WriteOutcome::Unchanged)
    }
}

/// Result of one pull run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub mode: PullMode,
    pub days_back: u32,
    pub provider: String,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Datasets created or rewritten.
    pub changed: usize,
    pub records_added: usize,
    pub records_replaced: usize,
    pub outcomes: Vec<AssetOutcome>,
}

impl RunSummary {
    pub fn new(
        request: &PullRequest,
        run_date: NaiveDate,
        provider: &str,
        outcomes: Vec<AssetOutcome>,
    ) -> Self {
        let count = |status| outcomes.iter().filter(|o| o.status == status).count();
        let merges = || outcomes.iter().filter_map(|o| o.merge.as_ref());

        Self {
            run_date,
            mode: request.mode(),
            days_back: request.days_back(),
            provider: provider.to_string(),
            total: outcomes.len(),
            succeeded: count(OutcomeStatus::Succeeded),
            skipped: count(OutcomeStatus::Skipped),
            failed: count(OutcomeStatus::Failed),
            cancelled: count(OutcomeStatus::Cancelled),
            changed: outcomes.iter().filter(|o| o.changed()).count(),
            records_added: merges().map(|m| m.added).sum(),
            records_replaced: merges().map(|m| m.replaced).sum(),
            outcomes,
        }
    }

    /// No asset succeeded although at least one was attempted.
    pub fn is_total_failure(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_total_failure() {
            1
        } else {
            0
        }
    }

    pub fn outcome(&self, symbol: &str) -> Option<&AssetOutcome> {
        self.outcomes.iter().find(|o| o.symbol == symbol)
    }

    /// Write `last_run_summary.json` into `dir`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        let path = dir.join(SUMMARY_FILE);
        write_json(&path, self)?;
        Ok(path)
    }

    pub fn read(dir: &Path) -> Result<Option<Self>, StoreError> {
        read_json(&dir.join(SUMMARY_FILE))
    }
}

/// Contents of `assets.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub total_assets: usize,
    /// Sorted, deduplicated catalog symbols.
    pub assets: Vec<String>,
    pub donchian_periods: Vec<usize>,
    /// Stats of every catalog asset that has a dataset file.
    pub datasets: Vec<DatasetStats>,
}

impl AssetManifest {
    pub fn build<S: AsRef<str>>(store: &DatasetStore, symbols: &[S]) -> Result<Self, StoreError> {
        let mut assets: Vec<String> = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        assets.sort();
        assets.dedup();

        let mut datasets = Vec::new();
        for symbol in &assets {
            match store.stats(symbol) {
                Ok(Some(stats)) => datasets.push(stats),
                // The file belongs to a colliding symbol and is listed under it.
                Ok(None) | Err(StoreError::AssetMismatch { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            total_assets: assets.len(),
            assets,
            donchian_periods: store.donchian_periods().to_vec(),
            datasets,
        })
    }

    pub fn write(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        let path = dir.join(MANIFEST_FILE);
        write_json(&path, self)?;
        Ok(path)
    }

    pub fn read(dir: &Path) -> Result<Option<Self>, StoreError> {
        read_json(&dir.join(MANIFEST_FILE))
    }
}

/// Write both run artifacts into the store's directory.
pub fn write_run_artifacts<S: AsRef<str>>(
    summary: &RunSummary,
    store: &DatasetStore,
    symbols: &[S],
) -> Result<(), StoreError> {
    AssetManifest::build(store, symbols)?.write(store.root())?;
    summary.write(store.root())?;
    Ok(())
}

/// Write the run artifacts and return the process exit code.
///
/// The exit code depends only on the pull; a failed artifact write is logged
/// and does not affect it.
pub fn record_run<S: AsRef<str>>(summary: &RunSummary, store: &DatasetStore, symbols: &[S]) -> i32 {
    if let Err(e) = write_run_artifacts(summary, store, symbols) {
        error!(
            "failed to write run artifacts in {}: {e}",
            store.root().display()
        );
    }
    summary.exit_code()
}

/// Pretty JSON with a trailing newline, written atomically and only when the
/// bytes differ from what is on disk.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<bool, StoreError> {
    let mut bytes =
        serde_json::to_vec_pretty(value).map_err(|e| StoreError::Encode(e.to_string()))?;
    bytes.push(b'\n');

    match fs::read(path) {
        Ok(existing) if existing == bytes => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_atomic(path, &bytes)?;
    Ok(true)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
