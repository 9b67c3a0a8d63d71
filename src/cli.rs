//! Command-line interface definitions for Qiita Search.
//!
//! Tuning options can also be provided via environment variables; anything not
//! given falls back to the config file, then to built-in defaults.

use clap::Parser;
use qiita_search::config::ScraperConfig;
use qiita_search::models::SortMode;
use qiita_search::paginator::Mode;

/// Command-line arguments for the Qiita Search application.
///
/// # Examples
///
/// ```sh
/// # First three pages, fetched concurrently
/// qiita_search "rust async" 3
///
/// # Stop at the last page of results, newest first, as JSON lines
/// qiita_search tokio 10 --mode sequential --sort created --json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search keyword; whitespace-separated terms are all required
    pub keyword: String,

    /// Highest page number to request
    #[arg(allow_negative_numbers = true)]
    pub limit: i64,

    /// Result ordering
    #[arg(short, long, value_enum, default_value_t = SortMode::Like)]
    pub sort: SortMode,

    /// Pagination strategy
    #[arg(long, value_enum, default_value_t = Mode::Bounded)]
    pub mode: Mode,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "QIITA_SEARCH_CONFIG")]
    pub config: Option<String>,

    /// Maximum concurrent requests in bounded mode
    #[arg(long, env = "QIITA_SEARCH_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Pause between requests in sequential mode, in milliseconds
    #[arg(long, env = "QIITA_SEARCH_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "QIITA_SEARCH_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Print one JSON object per record instead of text blocks
    #[arg(short, long)]
    pub json: bool,
}

impl Cli {
    /// Overlay command-line overrides on a loaded configuration.
    pub fn apply_overrides(&self, mut config: ScraperConfig) -> ScraperConfig {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.request_interval_ms = delay_ms;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.request_timeout_secs = timeout_secs;
        }
        config
    }
}
