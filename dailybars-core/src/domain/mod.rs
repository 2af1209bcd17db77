//! Domain types: assets, canonical OHLC records, and pull requests.

pub mod asset;
pub mod record;
pub mod request;

pub use asset::Asset;
pub use record::OhlcRecord;
pub use request::{PullMode, PullRequest, PullRequestError};
