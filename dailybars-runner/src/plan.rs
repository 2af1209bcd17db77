//! Fetch window planning: which dates to request for one asset.

use chrono::{Duration, NaiveDate};
use dailybars_core::domain::{PullMode, PullRequest};
use serde::{Deserialize, Serialize};

/// Why a window was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowReason {
    /// The last `days_back` days, plus the last stored day when it falls
    /// just before them.
    Incremental,
    /// Incremental, widened back to the last stored record.
    GapFill,
    /// No dataset yet: whole history even though the run is incremental.
    Bootstrap,
    FullHistorical,
}

/// Inclusive date range to fetch for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: WindowReason,
}

impl FetchWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Plan the window for one asset.
///
/// - full historical: `[earliest, today]`
/// - incremental: `[min(today - days_back + 1, last), today]`, and the whole
///   history when nothing is stored yet
///
/// The last stored day is always inside an incremental window: it may hold
/// a candle that was still forming when it was written, and re-pulling it
/// lets the merge replace it with the closed one.
///
/// No window starts before `earliest`.
pub fn plan_window(
    request: &PullRequest,
    today: NaiveDate,
    earliest: NaiveDate,
    last_stored: Option<NaiveDate>,
) -> FetchWindow {
    let earliest = earliest.min(today);
    let full = |reason| FetchWindow {
        start: earliest,
        end: today,
        reason,
    };

    match (request.mode(), last_stored) {
        (PullMode::FullHistorical, _) => full(WindowReason::FullHistorical),
        (PullMode::Incremental, None) => full(WindowReason::Bootstrap),
        (PullMode::Incremental, Some(last)) => {
            let window_start = today
                .checked_sub_signed(Duration::days(i64::from(request.days_back()) - 1))
                .unwrap_or(earliest)
                .max(earliest);
            let reason = if last + Duration::days(1) < window_start {
                WindowReason::GapFill
            } else {
                WindowReason::Incremental
            };
            FetchWindow {
                start: window_start.min(last).max(earliest),
                end: today,
                reason,
            }
        }
    }
}
