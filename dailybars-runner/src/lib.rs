//! dailybars runner: pull orchestration on top of `dailybars-core`.
//!
//! - Pipeline configuration (TOML) and workflow invocation parameters
//! - Fetch window planning per asset
//! - Run controller over a bounded worker pool
//! - Run summary, exit code, and the JSON run artifacts

pub mod config;
pub mod controller;
pub mod plan;
pub mod progress;
pub mod summary;

pub use config::{ConfigError, Invocation, PipelineConfig};
pub use controller::{resolve_assets, run_pull, RunError, RunOptions};
pub use plan::{plan_window, FetchWindow, WindowReason};
pub use progress::{LogProgress, PullProgress};
pub use summary::{
    record_run, write_run_artifacts, AssetManifest, AssetOutcome, ErrorKind, OutcomeStatus,
    RunSummary,
};
