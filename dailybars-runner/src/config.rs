//! Pipeline configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. CLI flags are applied on top by the binary.

use chrono::NaiveDate;
use dailybars_core::data::hyperliquid::DEFAULT_BASE_URL;
use dailybars_core::data::{
    AssetCatalog, Backoff, CircuitBreaker, DatasetStore, HyperliquidConfig, MergePolicy,
    RetryPolicy,
};
use dailybars_core::data::donchian::DEFAULT_PERIODS;
use dailybars_core::domain::{Asset, PullMode, PullRequest, PullRequestError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATA_DIR: &str = "data/daily_ohlc";
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error(transparent)]
    Request(#[from] PullRequestError),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the per-asset datasets and run artifacts.
    pub data_dir: PathBuf,
    /// Size of the fetch worker pool.
    pub workers: usize,
    pub merge_policy: MergePolicy,
    pub donchian_periods: Vec<usize>,
    /// Overrides the provider's earliest available date for full pulls.
    pub history_start: Option<NaiveDate>,
    pub provider: ProviderSection,
    pub retry: RetrySection,
    pub breaker: BreakerSection,
    /// Static catalog. Empty means "discover from the provider".
    pub assets: Vec<Asset>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            workers: DEFAULT_WORKERS,
            merge_policy: MergePolicy::default(),
            donchian_periods: DEFAULT_PERIODS.to_vec(),
            history_start: None,
            provider: ProviderSection::default(),
            retry: RetrySection::default(),
            breaker: BreakerSection::default(),
            assets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Minimum spacing between requests, shared by all workers.
    pub request_interval_ms: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            request_interval_ms: 1200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub factor: f64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetrySection {
    fn default() -> Self {
        let backoff = Backoff::default();
        Self {
            max_attempts: RetryPolicy::default().max_attempts,
            base_delay_ms: backoff.base.as_millis() as u64,
            factor: backoff.factor,
            max_delay_ms: backoff.max.as_millis() as u64,
            jitter: backoff.jitter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSection {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for BreakerSection {
    fn default() -> Self {
        Self {
            failure_threshold: 8,
            cooldown_secs: 600,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if !self.retry.factor.is_finite() || self.retry.factor < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "retry.factor must be >= 1.0, got {}",
                self.retry.factor
            )));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::Invalid(
                "retry.max_delay_ms must not be below retry.base_delay_ms".into(),
            ));
        }
        if self.breaker.failure_threshold == 0 {
            return Err(ConfigError::Invalid("breaker.failure_threshold must be at least 1".into()));
        }
        if self.donchian_periods.contains(&0) {
            return Err(ConfigError::Invalid("donchian periods must be positive".into()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Backoff {
                base: Duration::from_millis(self.retry.base_delay_ms),
                factor: self.retry.factor,
                max: Duration::from_millis(self.retry.max_delay_ms),
                jitter: self.retry.jitter,
            },
        )
    }

    pub fn hyperliquid_config(&self) -> HyperliquidConfig {
        let defaults = HyperliquidConfig::default();
        HyperliquidConfig {
            base_url: self.provider.base_url.clone(),
            timeout: Duration::from_secs(self.provider.timeout_secs),
            request_interval: Duration::from_millis(self.provider.request_interval_ms),
            retry: self.retry_policy(),
            earliest_available: self.history_start.unwrap_or(defaults.earliest_available),
        }
    }

    pub fn circuit_breaker(&self) -> CircuitBreaker {
        CircuitBreaker::new(
            self.breaker.failure_threshold,
            Duration::from_secs(self.breaker.cooldown_secs),
        )
    }

    pub fn dataset_store(&self) -> DatasetStore {
        DatasetStore::new(&self.data_dir)
            .with_donchian_periods(self.donchian_periods.clone())
            .with_merge_policy(self.merge_policy)
    }

    pub fn catalog(&self) -> AssetCatalog {
        AssetCatalog::from_assets(self.assets.clone())
    }
}

/// Invocation parameters as the scheduled workflow passes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub full_historical: bool,
    pub days_back: u32,
}

impl Default for Invocation {
    fn default() -> Self {
        Self {
            full_historical: false,
            days_back: 1,
        }
    }
}

impl Invocation {
    /// Read `FULL_HISTORICAL`, `DAYS_BACK` and `GITHUB_EVENT_NAME` through `lookup`.
    ///
    /// `FULL_HISTORICAL` only counts on a manual `workflow_dispatch` run, so a
    /// leftover variable never turns a scheduled run into a full re-pull.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let manual = lookup("GITHUB_EVENT_NAME").as_deref() == Some("workflow_dispatch");
        let full_historical = manual
            && lookup("FULL_HISTORICAL")
                .map(|v| parse_flag(&v))
                .transpose()?
                .unwrap_or(false);

        let days_back = match lookup("DAYS_BACK") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidEnv {
                        name: "DAYS_BACK",
                        value: raw.clone(),
                    })?
            }
            _ => 1,
        };

        Ok(Self {
            full_historical,
            days_back,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn to_request(self) -> Result<PullRequest, ConfigError> {
        let mode = if self.full_historical {
            PullMode::FullHistorical
        } else {
            PullMode::Incremental
        };
        Ok(PullRequest::new(mode, self.days_back)?)
    }
}

fn parse_flag(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name: "FULL_HISTORICAL",
            value: raw.to_string(),
        }),
    }
}
