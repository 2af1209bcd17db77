//! PullRequest: what a single invocation asks for.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which date range a pull covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullMode {
    /// The most recent `days_back` days, ending today.
    Incremental,
    /// Each asset's entire available history.
    FullHistorical,
}

impl PullMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullMode::Incremental => "incremental",
            PullMode::FullHistorical => "full_historical",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PullRequestError {
    #[error("days_back must be at least 1")]
    ZeroDaysBack,
}

/// Per-invocation pull parameters. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    mode: PullMode,
    days_back: u32,
}

impl PullRequest {
    pub fn new(mode: PullMode, days_back: u32) -> Result<Self, PullRequestError> {
        if days_back == 0 {
            return Err(PullRequestError::ZeroDaysBack);
        }
        Ok(Self { mode, days_back })
    }

    pub fn incremental(days_back: u32) -> Result<Self, PullRequestError> {
        Self::new(PullMode::Incremental, days_back)
    }

    pub fn full_historical() -> Self {
        Self {
            mode: PullMode::FullHistorical,
            days_back: 1,
        }
    }

    pub fn mode(&self) -> PullMode {
        self.mode
    }

    pub fn days_back(&self) -> u32 {
        self.days_back
    }
}
