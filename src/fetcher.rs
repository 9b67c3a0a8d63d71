//! Search page retrieval.
//!
//! [`PageSource`] is the seam between pagination and the network: the paginator
//! only ever asks a source for "page `n` of this query". [`HttpFetcher`] is the
//! real implementation and issues exactly one GET per call, with no retry and
//! no caching.
//!
//! # URL Pattern
//!
//! ```text
//! https://qiita.com/search?page=<n>&q=<term1>+<term2>&sort=<mode>
//! ```

use crate::config::ScraperConfig;
use crate::error::{ConfigError, FetchError};
use crate::models::SearchQuery;
use crate::utils::truncate_for_log;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Anything that can produce the raw markup of one search page.
pub trait PageSource {
    /// Fetch page `page` (1-based) of `query`.
    ///
    /// Failures are returned, never panicked on; the caller decides whether a
    /// failed page is skipped.
    async fn fetch(&self, query: &SearchQuery, page: u32) -> Result<String, FetchError>;
}

/// Build the search URL for one page.
///
/// The keyword is inserted pre-joined with `+` rather than through a query
/// serializer, which would escape the separators.
pub fn search_url(base: &Url, query: &SearchQuery, page: u32) -> String {
    format!(
        "{}/search?page={}&q={}&sort={}",
        base.as_str().trim_end_matches('/'),
        page,
        query.encoded_keyword(),
        query.sort().as_param(),
    )
}

/// [`PageSource`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    /// Build a fetcher from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the base URL does not parse or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &ScraperConfig) -> Result<Self, ConfigError> {
        let base = config.base()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ConfigError::Client)?;
        Ok(Self { client, base })
    }
}

impl PageSource for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(page = page))]
    async fn fetch(&self, query: &SearchQuery, page: u32) -> Result<String, FetchError> {
        let url = search_url(&self.base, query, page);
        debug!(%url, "Requesting search page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(page, e))?;

        let status = response.status();
        if !status.is_success() {
            // Body is only read for the log line; a failure here changes nothing.
            let preview = response.text().await.unwrap_or_default();
            warn!(%url, %status, body = %truncate_for_log(&preview, 200), "Search page request rejected");
            return Err(FetchError::Status { page, status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(page, e))?;
        info!(bytes = body.len(), "Fetched search page");
        Ok(body)
    }
}
