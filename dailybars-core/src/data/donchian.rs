//! Donchian channels: highest high / lowest low over a lookback window.
//!
//! Written as derived columns next to each stored record. For period `p` the
//! first `p - 1` rows have no value.

use crate::domain::OhlcRecord;

/// Periods written when the configuration does not override them.
pub const DEFAULT_PERIODS: [usize; 9] = [5, 10, 20, 30, 60, 90, 150, 250, 360];

/// Upper, lower and mid band for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonchianBand {
    pub high: f64,
    pub low: f64,
    pub mid: f64,
}

/// Channel values for `records` (sorted by date) over `period` rows.
pub fn donchian(records: &[OhlcRecord], period: usize) -> Vec<Option<DonchianBand>> {
    let n = records.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    for i in (period - 1)..n {
        let window = &records[i + 1 - period..=i];
        let high = window
            .iter()
            .map(|r| r.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
        out[i] = Some(DonchianBand {
            high,
            low,
            mid: (high + low) / 2.0,
        });
    }
    out
}

/// Column names for a period, in write order.
pub fn column_names(period: usize) -> [String; 3] {
    [
        format!("donchian_high_{period}"),
        format!("donchian_low_{period}"),
        format!("donchian_mid_{period}"),
    ]
}
