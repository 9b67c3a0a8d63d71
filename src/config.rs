//! Runtime configuration for fetching and pagination.
//!
//! All fields have defaults, so an empty YAML document (or no file at all)
//! yields a working configuration pointed at the public site.
//!
//! ```yaml
//! base_url: https://qiita.com
//! concurrency: 5
//! request_timeout_secs: 30
//! request_interval_ms: 1000
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Default site root; article links are resolved against it.
pub const DEFAULT_BASE_URL: &str = "https://qiita.com";
/// Default bound on simultaneous in-flight fetches in bounded mode.
pub const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root, e.g. `https://qiita.com`. The search endpoint is `<base_url>/search`.
    pub base_url: String,
    /// Maximum in-flight fetches in bounded mode.
    pub concurrency: usize,
    /// Per-request timeout covering connect and body download.
    pub request_timeout_secs: u64,
    /// Minimum pause between requests in sequential mode. `0` disables it.
    pub request_interval_ms: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: 30,
            request_interval_ms: 1000,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScraperConfig {
    /// Load a YAML config file. Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] / [`ConfigError::Parse`] when the file cannot
    /// be read or is not valid YAML for this struct, or any error from
    /// [`ScraperConfig::validate`].
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScraperConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        info!(base_url = %config.base_url, concurrency = config.concurrency, "Loaded configuration");
        Ok(config)
    }

    /// Check values that would otherwise only fail once requests start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.base()?;
        Ok(())
    }

    /// Parsed [`base_url`](Self::base_url).
    pub fn base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}
