//! Application configuration loaded from an optional YAML file.
//!
//! Every field has a default, so the file may omit anything (or be absent
//! entirely). Command-line flags override values from the file.
//!
//! ```yaml
//! base_url: https://newsapi.org/v2
//! sources_file: sources.csv
//! sample_size: 10
//! max_retries: 5
//! timeout_secs: 30
//! overall_strategy: label-words
//! lexicon_path: /usr/share/vader/vader_lexicon.txt
//! ```

use crate::sentiment::aggregator::OverallStrategy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// API key; normally supplied through `NEWS_API_KEY` instead.
    pub api_key: Option<String>,
    /// Root of the news API, without a trailing endpoint.
    pub base_url: String,
    /// Where the allowed source ids are kept.
    pub sources_file: String,
    /// How many scored articles to show in the report.
    pub sample_size: usize,
    /// Retry attempts for transient API failures.
    pub max_retries: usize,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Results per page requested from the API.
    pub page_size: Option<u32>,
    pub overall_strategy: OverallStrategy,
    /// Replacement lexicon file in VADER format.
    pub lexicon_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org/v2".to_string(),
            sources_file: "sources.csv".to_string(),
            sample_size: 10,
            max_retries: 5,
            timeout_secs: 30,
            page_size: None,
            overall_strategy: OverallStrategy::default(),
            lexicon_path: None,
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        // an empty document deserializes as unit, not as an empty map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load configuration from `path`, or defaults when no path is given.
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: origin.clone(),
            source,
        })?;
        let config = Self::from_yaml(&text, &origin)?;
        info!(config_path = %origin, "Loaded configuration");
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
