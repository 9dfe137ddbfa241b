use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

use super::draft::DEFAULT_CURRENCY;

/// Where portfolio-wide stats come from after each fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsSource {
    /// Ask the backend's stats endpoint
    #[default]
    Backend,
    /// Compute from the fetched holdings
    Local,
}

/// Client settings. Every field has a default, so a partial JSON document
/// (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the portfolio API (e.g., "https://api.example.com")
    pub api_base_url: String,

    /// Currency new holdings are recorded in (e.g., "php", "usd").
    pub default_currency: String,

    /// Background refresh period of the dashboard, in seconds.
    pub poll_interval_secs: u64,

    /// Per-request timeout, in seconds. Ignored on WASM.
    pub request_timeout_secs: u64,

    pub stats_source: StatsSource,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            poll_interval_secs: 76,
            request_timeout_secs: 30,
            stats_source: StatsSource::Backend,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;
        settings.validated()
    }

    /// Read settings from a JSON file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Check the settings and normalize URL and currency spelling.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.validate()?;
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self.default_currency = self.default_currency.trim().to_lowercase();
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "api_base_url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.default_currency.trim().is_empty() {
            return Err(CoreError::Config("default_currency cannot be empty".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(CoreError::Config("poll_interval_secs must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
