use crate::tester::{DEFAULT_SEARCH_LIMIT, EMPTY_QUERY, TesterOptions};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Settings handed to one adapter (credentials, cookies, site options)
pub type AdapterSettings = HashMap<String, String>;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub tester: TesterConfig,

    /// Per-adapter settings keyed by adapter id
    #[serde(default)]
    pub adapters: HashMap<String, AdapterSettings>,
}

impl Config {
    /// Load config from file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Settings for an adapter, empty if none are configured
    #[must_use]
    pub fn settings_for(&self, adapter_id: &str) -> AdapterSettings {
        self.adapters.get(adapter_id).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesterConfig {
    #[serde(default)]
    pub download: bool,

    #[serde(default = "default_color")]
    pub color: bool,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default = "default_empty_query")]
    pub empty_query: String,
}

fn default_color() -> bool {
    true
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_empty_query() -> String {
    EMPTY_QUERY.to_string()
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            download: false,
            color: default_color(),
            search_limit: default_search_limit(),
            empty_query: default_empty_query(),
        }
    }
}

impl From<&TesterConfig> for TesterOptions {
    fn from(config: &TesterConfig) -> Self {
        Self {
            download: config.download,
            color: config.color,
            search_limit: config.search_limit,
            empty_query: config.empty_query.clone(),
        }
    }
}
