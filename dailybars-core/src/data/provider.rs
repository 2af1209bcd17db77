//! Market data provider trait and the fetch error taxonomy.
//!
//! The MarketDataProvider trait abstracts over data sources (the Hyperliquid
//! info API in production, scripted providers in tests). The dataset store
//! sits above this trait; providers know nothing about persisted files.

use crate::domain::Asset;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A numeric field as it arrives on the wire.
///
/// Hyperliquid encodes prices and volume as decimal strings; other sources
/// send JSON numbers. The normalizer accepts either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            WireNumber::Number(n) => Some(*n),
            WireNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for WireNumber {
    fn from(n: f64) -> Self {
        WireNumber::Number(n)
    }
}

/// Raw daily candle from a provider (before normalization).
///
/// Field names follow Hyperliquid's `candleSnapshot` payload: `t` is the open
/// time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCandle {
    #[serde(rename = "t", default)]
    pub open_time_ms: Option<i64>,
    #[serde(rename = "o", default)]
    pub open: Option<WireNumber>,
    #[serde(rename = "h", default)]
    pub high: Option<WireNumber>,
    #[serde(rename = "l", default)]
    pub low: Option<WireNumber>,
    #[serde(rename = "c", default)]
    pub close: Option<WireNumber>,
    #[serde(rename = "v", default)]
    pub volume: Option<WireNumber>,
}

impl RawCandle {
    /// Convenience constructor for a fully populated candle.
    pub fn new(open_time_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open_time_ms: Some(open_time_ms),
            open: Some(open.into()),
            high: Some(high.into()),
            low: Some(low.into()),
            close: Some(close.into()),
            volume: Some(volume.into()),
        }
    }
}

/// Errors a provider can fail a fetch with.
///
/// `RateLimited` and `TransientNetwork` are retried by the provider's retry
/// policy; when one of them reaches the caller the retries are exhausted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("symbol not found: {symbol}")]
    NotFound { symbol: String },

    #[error("transient network error: {0}")]
    TransientNetwork(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("circuit breaker open: provider requests suspended")]
    CircuitOpen,
}

impl FetchError {
    /// Whether the retry policy should attempt the request again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::RateLimited { .. } | FetchError::TransientNetwork(_)
        )
    }

    /// Whether the asset should be skipped (logged, not counted as a failure).
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            FetchError::NotFound { .. } | FetchError::Auth(_) | FetchError::MalformedResponse(_)
        )
    }
}

/// Result of a successful fetch for a single asset.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub candles: Vec<RawCandle>,
}

/// Trait for daily candle providers.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Every asset the provider lists, including inactive ones.
    fn list_assets(&self) -> Result<Vec<Asset>, FetchError>;

    /// First date a full historical pull should start from.
    fn earliest_available(&self, asset: &Asset) -> NaiveDate;

    /// Fetch daily candles for `asset` over the inclusive UTC date range.
    fn fetch_daily(
        &self,
        asset: &Asset,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, FetchError>;

    /// Check if the provider is currently accepting requests.
    fn is_available(&self) -> bool;
}
