//! # Qiita Search
//!
//! Fetches paginated search-result pages from Qiita, extracts one
//! [`ArticleRecord`](models::ArticleRecord) per result block (title, absolute
//! URL, tags, snippet) and returns them in page order.
//!
//! ## Architecture
//!
//! The library is a small pipeline:
//! 1. **Fetching** ([`fetcher`]): one GET per search page behind the [`PageSource`](fetcher::PageSource) trait
//! 2. **Extraction** ([`extractor`]): result blocks → records, skipping malformed blocks
//! 3. **Pagination** ([`paginator`]): bounded-concurrency or sequential probing
//! 4. **Pipeline** ([`pipeline`]): validation, ordering, and accounting of skipped content
//!
//! ## Usage
//!
//! ```no_run
//! use qiita_search::config::ScraperConfig;
//! use qiita_search::fetcher::HttpFetcher;
//! use qiita_search::models::SortMode;
//! use qiita_search::paginator::{Mode, Paginator};
//! use qiita_search::pipeline::{Pipeline, SearchRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScraperConfig::default();
//! let pipeline = Pipeline::new(HttpFetcher::new(&config)?, Paginator::new(&config)?);
//! let request = SearchRequest {
//!     keyword: "rust async".to_string(),
//!     sort: SortMode::Like,
//!     page_limit: 3,
//!     mode: Mode::Bounded,
//! };
//! let outcome = pipeline.search(&request, &CancellationToken::new()).await?;
//! for record in &outcome.records {
//!     println!("{} {}", record.title, record.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod paginator;
pub mod pipeline;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
