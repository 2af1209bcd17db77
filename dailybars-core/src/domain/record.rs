//! OhlcRecord: the canonical daily candle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily candle for one asset.
///
/// `date` is the UTC calendar date of the candle's open time. A dataset holds
/// at most one record per `(asset, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcRecord {
    pub date: NaiveDate,
    pub asset: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl OhlcRecord {
    /// Price sanity: all prices finite and positive, high above and low below
    /// both open and close, volume (if any) finite and non-negative.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        if let Some(v) = self.volume {
            if !v.is_finite() || v < 0.0 {
                return false;
            }
        }
        self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
