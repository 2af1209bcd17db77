//! Hyperliquid info API provider.
//!
//! Both asset discovery (`meta`) and daily candles (`candleSnapshot`) are
//! plain JSON POSTs to the same endpoint. Each exchange goes through the
//! shared request pacer and circuit breaker and is retried by the retry
//! policy on rate limits and transient failures.

use super::circuit_breaker::CircuitBreaker;
use super::pacer::RequestPacer;
use super::provider::{FetchError, FetchResult, MarketDataProvider, RawCandle};
use super::retry::RetryPolicy;
use crate::domain::asset::{Asset, DEFAULT_VENUE};
use chrono::{Duration as Days, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.hyperliquid.xyz/info";

/// The provider returns at most this many candles per snapshot request.
pub const MAX_CANDLES_PER_REQUEST: i64 = 5000;

const MS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Deserialize)]
struct MetaResponse {
    universe: Vec<MetaAsset>,
}

#[derive(Debug, Deserialize)]
struct MetaAsset {
    name: String,
    #[serde(rename = "isDelisted", default)]
    is_delisted: bool,
}

/// Connection settings for the Hyperliquid provider.
#[derive(Debug, Clone)]
pub struct HyperliquidConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub request_interval: Duration,
    pub retry: RetryPolicy,
    /// Start of a full historical pull. Earlier than any listing, so the
    /// provider returns each asset's whole history.
    pub earliest_available: NaiveDate,
}

impl Default for HyperliquidConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            request_interval: Duration::from_millis(1200),
            retry: RetryPolicy::default(),
            earliest_available: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
        }
    }
}

pub struct HyperliquidProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    pacer: RequestPacer,
    retry: RetryPolicy,
    earliest_available: NaiveDate,
}

impl HyperliquidProvider {
    pub fn new(
        config: HyperliquidConfig,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("dailybars/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::TransientNetwork(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url,
            circuit_breaker,
            pacer: RequestPacer::new(config.request_interval),
            retry: config.retry,
            earliest_available: config.earliest_available,
        })
    }

    /// Request body for a daily candle snapshot.
    fn candle_body(coin: &str, start: NaiveDate, end: NaiveDate) -> Value {
        let (start_ms, end_ms) = day_bounds_ms(start, end);
        json!({
            "type": "candleSnapshot",
            "req": {
                "coin": coin,
                "interval": "1d",
                "startTime": start_ms,
                "endTime": end_ms,
            }
        })
    }

    /// One POST, no retries.
    fn post_once<T: DeserializeOwned>(&self, body: &Value, symbol: &str) -> Result<T, FetchError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(FetchError::CircuitOpen);
        }
        self.pacer.wait();

        let resp = match self.client.post(&self.base_url).json(body).send() {
            Ok(resp) => resp,
            Err(e) => {
                self.circuit_breaker.record_failure();
                return Err(FetchError::TransientNetwork(format!("{symbol}: {e}")));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let err = classify_status(status.as_u16(), retry_after, symbol);
            if err.is_retryable() {
                self.circuit_breaker.record_failure();
            }
            return Err(err);
        }

        let parsed = resp
            .json::<T>()
            .map_err(|e| FetchError::MalformedResponse(format!("{symbol}: {e}")))?;
        self.circuit_breaker.record_success();
        Ok(parsed)
    }

    fn post<T: DeserializeOwned>(&self, body: &Value, symbol: &str) -> Result<T, FetchError> {
        self.retry.run(|attempt| {
            debug!(symbol, attempt, "POST {}", self.base_url);
            self.post_once(body, symbol)
        })
    }
}

impl MarketDataProvider for HyperliquidProvider {
    fn name(&self) -> &str {
        "hyperliquid"
    }

    fn list_assets(&self) -> Result<Vec<Asset>, FetchError> {
        let meta: MetaResponse = self.post(&json!({ "type": "meta" }), "meta")?;
        Ok(meta_to_assets(meta))
    }

    fn earliest_available(&self, _asset: &Asset) -> NaiveDate {
        self.earliest_available
    }

    fn fetch_daily(
        &self,
        asset: &Asset,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, FetchError> {
        let mut candles = Vec::new();
        for (chunk_start, chunk_end) in chunk_ranges(start, end) {
            let body = Self::candle_body(&asset.symbol, chunk_start, chunk_end);
            let chunk: Vec<RawCandle> = self.post(&body, &asset.symbol)?;
            debug!(
                symbol = %asset.symbol,
                %chunk_start,
                %chunk_end,
                candles = chunk.len(),
                "candle snapshot"
            );
            candles.extend(chunk);
        }

        if candles.is_empty() {
            return Err(FetchError::NotFound {
                symbol: asset.symbol.clone(),
            });
        }

        Ok(FetchResult {
            symbol: asset.symbol.clone(),
            candles,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

fn meta_to_assets(meta: MetaResponse) -> Vec<Asset> {
    meta.universe
        .into_iter()
        .map(|a| Asset {
            symbol: a.name,
            venue: DEFAULT_VENUE.to_string(),
            active: !a.is_delisted,
        })
        .collect()
}

/// Map a non-success HTTP status onto the fetch error taxonomy.
pub fn classify_status(status: u16, retry_after_secs: Option<u64>, symbol: &str) -> FetchError {
    match status {
        429 => FetchError::RateLimited {
            retry_after: retry_after_secs.map(Duration::from_secs),
        },
        401 | 403 => FetchError::Auth(format!("HTTP {status} for {symbol}")),
        404 => FetchError::NotFound {
            symbol: symbol.to_string(),
        },
        408 | 500..=599 => FetchError::TransientNetwork(format!("HTTP {status} for {symbol}")),
        _ => FetchError::MalformedResponse(format!("unexpected HTTP {status} for {symbol}")),
    }
}

/// Epoch-millisecond bounds covering whole UTC days `start..=end`.
pub fn day_bounds_ms(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let epoch = NaiveDate::default();
    let start_ms = (start - epoch).num_days() * MS_PER_DAY;
    let end_ms = ((end - epoch).num_days() + 1) * MS_PER_DAY - 1;
    (start_ms, end_ms)
}

/// Split `start..=end` into inclusive ranges of at most
/// `MAX_CANDLES_PER_REQUEST` days.
pub fn chunk_ranges(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut ranges = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let chunk_end = (cursor + Days::days(MAX_CANDLES_PER_REQUEST - 1)).min(end);
        ranges.push((cursor, chunk_end));
        cursor = chunk_end + Days::days(1);
    }
    ranges
}
