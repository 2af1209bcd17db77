//! dailybars core: domain types and the data layer.
//!
//! - Domain types (assets, canonical OHLC records, pull requests)
//! - Provider trait with the fetch error taxonomy, and the Hyperliquid client
//! - Bounded retry policy, request pacer and circuit breaker
//! - Normalizer from provider candles to canonical records
//! - Per-asset CSV dataset store with atomic, idempotent merges

pub mod data;
pub mod domain;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with the worker pool are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Asset>();
        require_sync::<domain::Asset>();
        require_send::<domain::OhlcRecord>();
        require_sync::<domain::OhlcRecord>();
        require_send::<domain::PullRequest>();
        require_sync::<domain::PullRequest>();

        require_send::<data::DatasetStore>();
        require_sync::<data::DatasetStore>();
        require_send::<data::HyperliquidProvider>();
        require_sync::<data::HyperliquidProvider>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::RequestPacer>();
        require_sync::<data::RequestPacer>();
        require_send::<data::FetchError>();
        require_sync::<data::FetchError>();
        require_send::<data::StoreError>();
        require_sync::<data::StoreError>();
    }
}
