//! Asset: an instrument in the pull catalog.

use serde::{Deserialize, Serialize};

/// Venue used when a catalog entry does not name one.
pub const DEFAULT_VENUE: &str = "hyperliquid";

/// A single instrument to pull daily candles for.
///
/// Assets are immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    #[serde(default = "default_venue")]
    pub venue: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Asset {
    /// An active asset on the default venue.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            venue: DEFAULT_VENUE.to_string(),
            active: true,
        }
    }

    pub fn inactive(symbol: impl Into<String>) -> Self {
        Self {
            active: false,
            ..Self::new(symbol)
        }
    }
}

fn default_venue() -> String {
    DEFAULT_VENUE.to_string()
}

fn default_active() -> bool {
    true
}
