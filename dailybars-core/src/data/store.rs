//! Per-asset CSV datasets with atomic, idempotent merges.
//!
//! Layout: `{root}/{SYMBOL}_daily.csv`
//!
//! - One row per date, sorted ascending, header first
//! - Columns: `date,asset,open,high,low,close,volume` then Donchian columns
//! - Floats use shortest round-trip formatting, so re-rendering the same
//!   records yields the same bytes and version control sees no diff
//! - Atomic writes (write `<file>.tmp`, fsync, rename into place)
//! - A merge that would not change the file does not touch it

use super::donchian::{self, DEFAULT_PERIODS};
use crate::domain::OhlcRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

const DATASET_SUFFIX: &str = "_daily.csv";
const BASE_COLUMNS: [&str; 7] = ["date", "asset", "open", "high", "low", "close", "volume"];

/// What happens when an incoming record's date is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Replace the stored record when the incoming one differs.
    #[default]
    Overwrite,
    /// Stored records are immutable; incoming duplicates are ignored.
    KeepExisting,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt dataset {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("csv encoding failed: {0}")]
    Encode(String),

    #[error("record for '{found}' cannot be stored in the '{expected}' dataset")]
    AssetMismatch { expected: String, found: String },

    #[error("refusing to store invalid record for '{asset}' on {date}")]
    InvalidRecord { asset: String, date: NaiveDate },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Effect of a merge on the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub outcome: WriteOutcome,
    /// Dates not previously stored.
    pub added: usize,
    /// Stored dates whose record was replaced with different values.
    pub replaced: usize,
    /// Rows in the dataset after the merge.
    pub total: usize,
}

/// Summary of one dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub symbol: String,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// BLAKE3 hash of the file bytes.
    pub data_hash: String,
}

/// Result of merging incoming records into stored ones.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecords {
    pub records: Vec<OhlcRecord>,
    pub added: usize,
    pub replaced: usize,
}

/// Handle to the dataset directory for one run.
#[derive(Debug)]
pub struct DatasetStore {
    root: PathBuf,
    donchian_periods: Vec<usize>,
    merge_policy: MergePolicy,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            donchian_periods: DEFAULT_PERIODS.to_vec(),
            merge_policy: MergePolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_donchian_periods(mut self, mut periods: Vec<usize>) -> Self {
        periods.retain(|p| *p > 0);
        periods.sort_unstable();
        periods.dedup();
        self.donchian_periods = periods;
        self
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.merge_policy
    }

    pub fn donchian_periods(&self) -> &[usize] {
        &self.donchian_periods
    }

    /// Path of the dataset file for `symbol`.
    pub fn dataset_path(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{}{DATASET_SUFFIX}", file_stem(symbol)))
    }

    pub fn exists(&self, symbol: &str) -> bool {
        self.dataset_path(symbol).is_file()
    }

    /// All stored records for `symbol`, sorted by date. Empty if no file.
    ///
    /// Fails with `AssetMismatch` when the file belongs to another symbol
    /// that maps to the same file name.
    pub fn load(&self, symbol: &str) -> Result<Vec<OhlcRecord>, StoreError> {
        let path = self.dataset_path(symbol);
        match read_optional(&path)? {
            Some(bytes) => parse_owned(&bytes, &path, symbol),
            None => Ok(Vec::new()),
        }
    }

    /// Date of the newest stored record.
    pub fn last_date(&self, symbol: &str) -> Result<Option<NaiveDate>, StoreError> {
        Ok(self.load(symbol)?.last().map(|r| r.date))
    }

    /// Row count, date range and content hash; `None` if no file.
    pub fn stats(&self, symbol: &str) -> Result<Option<DatasetStats>, StoreError> {
        let path = self.dataset_path(symbol);
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        let records = parse_owned(&bytes, &path, symbol)?;
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Ok(None);
        };
        Ok(Some(DatasetStats {
            symbol: symbol.to_string(),
            rows: records.len(),
            first_date: first.date,
            last_date: last.date,
            data_hash: blake3::hash(&bytes).to_hex().to_string(),
        }))
    }

    /// Symbols with a dataset file under the root, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(stem) = name.strip_suffix(DATASET_SUFFIX) else {
                continue;
            };
            let records = parse_csv(
                &fs::read(entry.path()).map_err(|e| StoreError::io(&entry.path(), e))?,
                &entry.path(),
            )?;
            symbols.push(
                records
                    .first()
                    .map(|r| r.asset.clone())
                    .unwrap_or_else(|| stem.to_string()),
            );
        }
        symbols.sort();
        Ok(symbols)
    }

    /// Merge `incoming` into the dataset for `symbol` and persist atomically.
    ///
    /// Holds the per-asset lock for the whole read-merge-write cycle.
    pub fn merge(&self, symbol: &str, incoming: &[OhlcRecord]) -> Result<MergeReport, StoreError> {
        for record in incoming {
            if record.asset != symbol {
                return Err(StoreError::AssetMismatch {
                    expected: symbol.to_string(),
                    found: record.asset.clone(),
                });
            }
            if !record.is_sane() {
                return Err(StoreError::InvalidRecord {
                    asset: record.asset.clone(),
                    date: record.date,
                });
            }
        }

        let lock = self.lock_for(symbol);
        let _guard = lock.lock().unwrap();

        let path = self.dataset_path(symbol);
        let existing_bytes = read_optional(&path)?;
        let existing = match &existing_bytes {
            Some(bytes) => parse_owned(bytes, &path, symbol)?,
            None => Vec::new(),
        };

        let merged = merge_records(self.merge_policy, existing, incoming);
        let total = merged.records.len();

        if merged.records.is_empty() {
            return Ok(MergeReport {
                outcome: WriteOutcome::Unchanged,
                added: 0,
                replaced: 0,
                total,
            });
        }

        let rendered = render_csv(&merged.records, &self.donchian_periods)?;
        let outcome = match &existing_bytes {
            Some(old) if *old == rendered => WriteOutcome::Unchanged,
            Some(_) => WriteOutcome::Updated,
            None => WriteOutcome::Created,
        };

        if outcome != WriteOutcome::Unchanged {
            fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
            write_atomic(&path, &rendered)?;
        }

        Ok(MergeReport {
            outcome,
            added: merged.added,
            replaced: merged.replaced,
            total,
        })
    }

    /// Keyed by file name, so symbols sharing a file share the lock.
    fn lock_for(&self, symbol: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        Arc::clone(locks.entry(file_stem(symbol)).or_default())
    }
}

/// Merge keyed by date under `policy`. Output is sorted and has one record
/// per date.
pub fn merge_records(
    policy: MergePolicy,
    existing: Vec<OhlcRecord>,
    incoming: &[OhlcRecord],
) -> MergedRecords {
    let mut by_date: BTreeMap<NaiveDate, OhlcRecord> =
        existing.into_iter().map(|r| (r.date, r)).collect();
    let mut added = 0;
    let mut replaced = 0;

    for record in incoming {
        match by_date.get(&record.date) {
            None => {
                by_date.insert(record.date, record.clone());
                added += 1;
            }
            Some(stored) if stored != record && policy == MergePolicy::Overwrite => {
                by_date.insert(record.date, record.clone());
                replaced += 1;
            }
            Some(_) => {}
        }
    }

    MergedRecords {
        records: by_date.into_values().collect(),
        added,
        replaced,
    }
}

/// Serialize records (sorted by date) with Donchian columns for `periods`.
pub fn render_csv(records: &[OhlcRecord], periods: &[usize]) -> Result<Vec<u8>, StoreError> {
    let encode = |e: csv::Error| StoreError::Encode(e.to_string());

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for &period in periods {
        header.extend(donchian::column_names(period));
    }
    wtr.write_record(&header).map_err(encode)?;

    let channels: Vec<_> = periods
        .iter()
        .map(|&p| donchian::donchian(records, p))
        .collect();

    for (i, r) in records.iter().enumerate() {
        let mut row = vec![
            r.date.to_string(),
            r.asset.clone(),
            fmt_f64(r.open),
            fmt_f64(r.high),
            fmt_f64(r.low),
            fmt_f64(r.close),
            r.volume.map(fmt_f64).unwrap_or_default(),
        ];
        for bands in &channels {
            match bands[i] {
                Some(b) => row.extend([fmt_f64(b.high), fmt_f64(b.low), fmt_f64(b.mid)]),
                None => row.extend([String::new(), String::new(), String::new()]),
            }
        }
        wtr.write_record(&row).map_err(encode)?;
    }

    wtr.into_inner()
        .map_err(|e| StoreError::Encode(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct StoredRow {
    date: NaiveDate,
    asset: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<f64>,
}

/// Parse a dataset file. Derived columns are ignored. Rows must be sane,
/// strictly ascending by date and belong to one asset.
pub fn parse_csv(bytes: &[u8], path: &Path) -> Result<Vec<OhlcRecord>, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let mut records: Vec<OhlcRecord> = Vec::new();

    for (line, row) in rdr.deserialize::<StoredRow>().enumerate() {
        let row = row.map_err(|e| corrupt(format!("row {}: {e}", line + 1)))?;
        let record = OhlcRecord {
            date: row.date,
            asset: row.asset,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        if !record.is_sane() {
            return Err(corrupt(format!("row {} violates price invariant", line + 1)));
        }
        if let Some(prev) = records.last() {
            if prev.date >= record.date {
                return Err(corrupt(format!(
                    "row {}: date {} not after {}",
                    line + 1,
                    record.date,
                    prev.date
                )));
            }
            if prev.asset != record.asset {
                return Err(corrupt(format!(
                    "row {}: mixed assets '{}' and '{}'",
                    line + 1,
                    prev.asset,
                    record.asset
                )));
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Write `bytes` to `path` via a temporary sibling and rename.
///
/// On any failure the temporary file is removed and `path` is untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp_path = tmp_path_for(path);

    let written = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::io(&tmp_path, e));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::io(path, e)
    })
}

/// Temporary sibling used while writing `path`.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// File-system safe name for a symbol (spot pairs contain `/`).
/// Parse a dataset file that must belong to `symbol`.
fn parse_owned(bytes: &[u8], path: &Path, symbol: &str) -> Result<Vec<OhlcRecord>, StoreError> {
    let records = parse_csv(bytes, path)?;
    match records.first() {
        Some(first) if first.asset != symbol => Err(StoreError::AssetMismatch {
            expected: symbol.to_string(),
            found: first.asset.clone(),
        }),
        _ => Ok(records),
    }
}

fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

fn fmt_f64(v: f64) -> String {
    format!("{v}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn rec(d: u32, close: f64) -> OhlcRecord {
        OhlcRecord {
            date: date(d),
            asset: "BTC".into(),
            open: 100.0,
            high: close.max(100.0) + 1.0,
            low: close.min(100.0) - 1.0,
            close,
            volume: Some(10.5),
        }
    }

    fn store(dir: &Path) -> DatasetStore {
        DatasetStore::new(dir).with_donchian_periods(vec![2])
    }

    #[test]
    fn first_merge_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let report = store.merge("BTC", &[rec(2, 101.0), rec(1, 99.0)]).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Created);
        assert_eq!(report.added, 2);
        assert_eq!(report.total, 2);

        let loaded = store.load("BTC").unwrap();
        assert_eq!(loaded, vec![rec(1, 99.0), rec(2, 101.0)]);
        assert_eq!(store.last_date("BTC").unwrap(), Some(date(2)));
    }

    #[test]
    fn file_layout_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut no_volume = rec(2, 101.5);
        no_volume.volume = None;
        store.merge("BTC", &[rec(1, 99.0), no_volume]).unwrap();

        let text = fs::read_to_string(dir.path().join("BTC_daily.csv")).unwrap();
        assert_eq!(
            text,
            "date,asset,open,high,low,close,volume,donchian_high_2,donchian_low_2,donchian_mid_2\n\
             2024-01-01,BTC,100,101,98,99,10.5,,,\n\
             2024-01-02,BTC,100,102.5,99,101.5,,102.5,98,100.25\n"
        );
    }

    #[test]
    fn identical_merge_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.merge("BTC", &[rec(1, 99.0), rec(2, 101.0)]).unwrap();
        let before = fs::read(store.dataset_path("BTC")).unwrap();

        let report = store.merge("BTC", &[rec(2, 101.0)]).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Unchanged);
        assert_eq!(report.added, 0);
        assert_eq!(report.replaced, 0);
        assert_eq!(fs::read(store.dataset_path("BTC")).unwrap(), before);
    }

    #[test]
    fn overwrite_policy_replaces_restated_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.merge("BTC", &[rec(1, 99.0), rec(2, 101.0)]).unwrap();

        let report = store.merge("BTC", &[rec(2, 103.0), rec(3, 104.0)]).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Updated);
        assert_eq!(report.added, 1);
        assert_eq!(report.replaced, 1);

        let loaded = store.load("BTC").unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[1].close, 103.0);
    }

    #[test]
    fn keep_existing_policy_ignores_restatements() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path()).with_merge_policy(MergePolicy::KeepExisting);
        store.merge("BTC", &[rec(1, 99.0)]).unwrap();

        let report = store.merge("BTC", &[rec(1, 50.0)]).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Unchanged);
        assert_eq!(store.load("BTC").unwrap()[0].close, 99.0);
    }

    #[test]
    fn empty_merge_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let report = store.merge("BTC", &[]).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Unchanged);
        assert!(!store.exists("BTC"));
    }

    #[test]
    fn wrong_asset_and_insane_records_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let mut eth = rec(1, 99.0);
        eth.asset = "ETH".into();
        assert!(matches!(
            store.merge("BTC", &[eth]),
            Err(StoreError::AssetMismatch { .. })
        ));

        let mut bad = rec(1, 99.0);
        bad.high = 1.0;
        assert!(matches!(
            store.merge("BTC", &[bad]),
            Err(StoreError::InvalidRecord { .. })
        ));
        assert!(!store.exists("BTC"));
    }

    #[test]
    fn failed_write_leaves_previous_file_intact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.merge("BTC", &[rec(1, 99.0)]).unwrap();
        let path = store.dataset_path("BTC");
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(tmp_path_for(&path)).unwrap();
        let err = store.merge("BTC", &[rec(2, 101.0)]).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));

        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(store.load("BTC").unwrap(), vec![rec(1, 99.0)]);
    }

    #[test]
    fn stale_temp_file_from_interrupted_run_is_ignored_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.merge("BTC", &[rec(1, 99.0)]).unwrap();
        let path = store.dataset_path("BTC");
        fs::write(tmp_path_for(&path), b"date,asset,open\n2024-01-0").unwrap();

        assert_eq!(store.load("BTC").unwrap(), vec![rec(1, 99.0)]);
        assert_eq!(store.list_symbols().unwrap(), vec!["BTC".to_string()]);

        store.merge("BTC", &[rec(2, 101.0)]).unwrap();
        assert_eq!(store.load("BTC").unwrap().len(), 2);
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn corrupt_file_is_reported_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let path = store.dataset_path("BTC");
        fs::write(&path, "date,asset,open,high,low,close,volume\nnot-a-date,BTC,1,1,1,1,\n").unwrap();

        assert!(matches!(store.load("BTC"), Err(StoreError::Corrupt { .. })));
        assert!(store.merge("BTC", &[rec(1, 99.0)]).is_err());
        assert!(fs::read_to_string(&path).unwrap().contains("not-a-date"));
    }

    #[test]
    fn duplicate_dates_on_disk_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BTC_daily.csv");
        let bytes = b"date,asset,open,high,low,close,volume\n\
            2024-01-01,BTC,1,2,1,1,\n\
            2024-01-01,BTC,1,2,1,1,\n";
        assert!(matches!(
            parse_csv(bytes, &path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn stats_report_range_and_hash() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert_eq!(store.stats("BTC").unwrap(), None);

        store.merge("BTC", &[rec(1, 99.0), rec(5, 101.0)]).unwrap();
        let stats = store.stats("BTC").unwrap().unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.first_date, date(1));
        assert_eq!(stats.last_date, date(5));
        assert_eq!(stats.data_hash.len(), 64);
    }

    #[test]
    fn spot_pair_symbols_get_safe_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert_eq!(
            store.dataset_path("PURR/USDC"),
            dir.path().join("PURR_USDC_daily.csv")
        );

        let mut purr = rec(1, 99.0);
        purr.asset = "PURR/USDC".into();
        store.merge("PURR/USDC", &[purr]).unwrap();
        assert_eq!(store.list_symbols().unwrap(), vec!["PURR/USDC".to_string()]);
    }

    #[test]
    fn symbols_sharing_a_file_name_never_overwrite_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert_eq!(store.dataset_path("A/B"), store.dataset_path("A_B"));

        let mut slash = rec(1, 99.0);
        slash.asset = "A/B".into();
        store.merge("A/B", &[slash.clone()]).unwrap();
        let path = store.dataset_path("A/B");
        let before = fs::read(&path).unwrap();

        let mut underscore = rec(2, 105.0);
        underscore.asset = "A_B".into();
        let err = store.merge("A_B", &[underscore]).unwrap_err();
        assert!(
            matches!(err, StoreError::AssetMismatch { ref expected, ref found } if expected == "A_B" && found == "A/B"),
            "got {err:?}"
        );
        assert!(matches!(store.load("A_B"), Err(StoreError::AssetMismatch { .. })));
        assert!(matches!(store.stats("A_B"), Err(StoreError::AssetMismatch { .. })));

        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(store.load("A/B").unwrap(), vec![slash]);
    }
}
