//! Data acquisition and persistence.

pub mod catalog;
pub mod circuit_breaker;
pub mod donchian;
pub mod hyperliquid;
pub mod normalize;
pub mod pacer;
pub mod provider;
pub mod retry;
pub mod store;

pub use catalog::{AssetCatalog, CatalogError};
pub use circuit_breaker::CircuitBreaker;
pub use hyperliquid::{HyperliquidConfig, HyperliquidProvider};
pub use normalize::{NormalizeError, Normalizer};
pub use pacer::RequestPacer;
pub use provider::{FetchError, FetchResult, MarketDataProvider, RawCandle, WireNumber};
pub use retry::{Backoff, RetryPolicy};
pub use store::{DatasetStats, DatasetStore, MergePolicy, MergeReport, StoreError, WriteOutcome};
