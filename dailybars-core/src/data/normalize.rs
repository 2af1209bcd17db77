//! Provider candles → canonical `OhlcRecord`s.
//!
//! Dates are the UTC calendar date of each candle's open time. A batch is
//! accepted only if every candle is complete and passes the price sanity
//! check; one bad candle rejects the whole batch so a dataset never mixes
//! validated and unvalidated history.

use super::provider::{RawCandle, WireNumber};
use crate::domain::OhlcRecord;
use chrono::{DateTime, NaiveDate};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizeError {
    #[error("invalid record for {asset} at index {index}: {reason}")]
    InvalidRecord {
        asset: String,
        index: usize,
        reason: String,
    },
}

pub struct Normalizer;

impl Normalizer {
    /// Convert a single candle.
    pub fn normalize_candle(
        asset: &str,
        index: usize,
        candle: &RawCandle,
    ) -> Result<OhlcRecord, NormalizeError> {
        let invalid = |reason: String| NormalizeError::InvalidRecord {
            asset: asset.to_string(),
            index,
            reason,
        };

        let ts = candle
            .open_time_ms
            .ok_or_else(|| invalid("missing open time".into()))?;
        let date = utc_date(ts).ok_or_else(|| invalid(format!("timestamp out of range: {ts}")))?;

        let price = |value: &Option<WireNumber>, field: &str| -> Result<f64, NormalizeError> {
            value
                .as_ref()
                .ok_or_else(|| invalid(format!("missing {field}")))?
                .to_f64()
                .ok_or_else(|| invalid(format!("unparseable {field}")))
        };

        let volume = match &candle.volume {
            None => None,
            Some(v) => Some(
                v.to_f64()
                    .ok_or_else(|| invalid("unparseable volume".into()))?,
            ),
        };

        let record = OhlcRecord {
            date,
            asset: asset.to_string(),
            open: price(&candle.open, "open")?,
            high: price(&candle.high, "high")?,
            low: price(&candle.low, "low")?,
            close: price(&candle.close, "close")?,
            volume,
        };

        if !record.is_sane() {
            return Err(invalid(format!(
                "price invariant violated on {}: o={} h={} l={} c={}",
                record.date, record.open, record.high, record.low, record.close
            )));
        }
        Ok(record)
    }

    /// Convert a batch: validate all, sort by date, collapse duplicate dates
    /// keeping the last occurrence.
    pub fn normalize_batch(
        asset: &str,
        candles: &[RawCandle],
    ) -> Result<Vec<OhlcRecord>, NormalizeError> {
        let mut by_date: BTreeMap<NaiveDate, OhlcRecord> = BTreeMap::new();
        for (index, candle) in candles.iter().enumerate() {
            let record = Self::normalize_candle(asset, index, candle)?;
            by_date.insert(record.date, record);
        }
        Ok(by_date.into_values().collect())
    }
}

/// UTC calendar date of an epoch-millisecond timestamp.
pub fn utc_date(ts_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ts_ms).map(|dt| dt.date_naive())
}
