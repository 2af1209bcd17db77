//! Asset catalog: the instruments a run pulls.
//!
//! Stored as a TOML `[[assets]]` array, or built from the provider's asset
//! listing. Inactive assets stay in the catalog but are never pulled.

use crate::domain::Asset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read catalog file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize catalog: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl AssetCatalog {
    pub fn from_assets(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    /// Load a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, CatalogError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Active assets in catalog order; a repeated symbol keeps its first entry.
    pub fn active_assets(&self) -> Vec<&Asset> {
        let mut seen = HashSet::new();
        self.assets
            .iter()
            .filter(|a| seen.insert(a.symbol.as_str()))
            .filter(|a| a.active)
            .collect()
    }

    /// Every symbol in the catalog, active or not.
    pub fn symbols(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.symbol.as_str()).collect()
    }
}
