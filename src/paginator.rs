//! Page scheduling: which pages to request, how many at once, and when to stop.
//!
//! Each page moves through `Pending → Fetching → {Parsed | FetchFailed | Empty}`;
//! the terminal state is recorded in a [`PageOutcome`]. Two strategies are
//! offered:
//!
//! | Mode | Requests | Stops early | Throughput |
//! |------|----------|-------------|------------|
//! | [`Mode::Bounded`] | always pages `1..=L` | no | up to `K` in flight |
//! | [`Mode::Sequential`] | `1, 2, …` until an empty page or `L` | yes | one at a time |
//!
//! In both modes outcomes are returned in ascending page order no matter in
//! which order the fetches completed, and a failed fetch only costs its own page.

use crate::config::ScraperConfig;
use crate::error::{ConfigError, ExtractionError, FetchError};
use crate::extractor::Extractor;
use crate::fetcher::PageSource;
use crate::models::{ArticleRecord, SearchQuery};
use clap::ValueEnum;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Pagination strategy chosen by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Dispatch every candidate page with at most `K` in flight, then extract in page order.
    #[default]
    Bounded,
    /// One page at a time, stopping at the first page without results.
    Sequential,
}

/// Terminal state of one requested page.
#[derive(Debug)]
pub enum PageState {
    /// At least one result block was found.
    Parsed {
        records: Vec<ArticleRecord>,
        failures: Vec<ExtractionError>,
    },
    /// The fetch failed; the page contributes no records.
    FetchFailed(FetchError),
    /// The page had no result blocks.
    Empty,
}

#[derive(Debug)]
pub struct PageOutcome {
    pub page: u32,
    pub state: PageState,
}

/// Everything a pagination run produced.
#[derive(Debug, Default)]
pub struct Pagination {
    /// One entry per completed page, ascending by page number.
    pub pages: Vec<PageOutcome>,
    /// Sequential mode stopped on an empty page before the limit.
    pub reached_end: bool,
    /// The cancellation token fired before the run finished.
    pub cancelled: bool,
}

pub struct Paginator {
    extractor: Extractor,
    concurrency: usize,
    request_interval: Duration,
}

impl Paginator {
    /// # Errors
    ///
    /// Fails on zero concurrency or an unparsable base URL.
    pub fn new(config: &ScraperConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            extractor: Extractor::new(config.base()?),
            concurrency: config.concurrency,
            request_interval: config.request_interval(),
        })
    }

    pub async fn run<S: PageSource>(
        &self,
        source: &S,
        query: &SearchQuery,
        mode: Mode,
        cancel: &CancellationToken,
    ) -> Pagination {
        match mode {
            Mode::Bounded => self.run_bounded(source, query, cancel).await,
            Mode::Sequential => self.run_sequential(source, query, cancel).await,
        }
    }

    /// Fetch pages `1..=limit` with at most `concurrency` in flight, then
    /// extract them in ascending page order.
    ///
    /// On cancellation, pages not yet dispatched are never requested and
    /// in-flight requests are dropped; pages that already completed are still
    /// extracted and returned.
    #[instrument(level = "info", skip_all, fields(limit = query.page_limit(), concurrency = self.concurrency))]
    pub async fn run_bounded<S: PageSource>(
        &self,
        source: &S,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Pagination {
        let mut fetches = stream::iter(1..=query.page_limit())
            .map(move |page| async move { (page, source.fetch(query, page).await) })
            .buffer_unordered(self.concurrency);

        // One slot per page, keyed by page number so completion order is irrelevant.
        let mut slots: BTreeMap<u32, Result<String, FetchError>> = BTreeMap::new();
        let mut cancelled = false;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = fetches.next() => match next {
                    Some((page, result)) => {
                        debug!(page, ok = result.is_ok(), "Page fetch completed");
                        slots.insert(page, result);
                    }
                    None => break,
                },
            }
        }
        drop(fetches);

        if cancelled {
            warn!(completed = slots.len(), "Bounded pagination cancelled");
        }

        let pages = slots
            .into_iter()
            .map(|(page, result)| self.settle(page, result))
            .collect::<Vec<_>>();

        info!(pages = pages.len(), "Bounded pagination finished");
        Pagination {
            pages,
            reached_end: false,
            cancelled,
        }
    }

    /// Fetch pages one at a time, stopping at the first page with no result
    /// blocks or once the limit has been requested.
    #[instrument(level = "info", skip_all, fields(limit = query.page_limit()))]
    pub async fn run_sequential<S: PageSource>(
        &self,
        source: &S,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Pagination {
        let mut pagination = Pagination::default();

        for page in 1..=query.page_limit() {
            if page > 1 && !self.request_interval.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        pagination.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.request_interval) => {}
                }
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    pagination.cancelled = true;
                    break;
                }
                result = source.fetch(query, page) => result,
            };

            let outcome = self.settle(page, result);
            let empty = matches!(outcome.state, PageState::Empty);
            pagination.pages.push(outcome);

            if empty {
                info!(page, "No results on page; stopping");
                pagination.reached_end = true;
                break;
            }
        }

        if pagination.cancelled {
            warn!(completed = pagination.pages.len(), "Sequential pagination cancelled");
        }
        info!(pages = pagination.pages.len(), "Sequential pagination finished");
        pagination
    }

    fn settle(&self, page: u32, result: Result<String, FetchError>) -> PageOutcome {
        let state = match result {
            Err(e) => {
                warn!(page, error = %e, "Skipping page after failed fetch");
                PageState::FetchFailed(e)
            }
            Ok(markup) => {
                let extraction = self.extractor.extract_page(&markup);
                if extraction.is_empty() {
                    debug!(page, "Page has no result blocks");
                    PageState::Empty
                } else {
                    if !extraction.failures.is_empty() {
                        warn!(page, skipped = extraction.failures.len(), "Some result blocks were skipped");
                    }
                    PageState::Parsed {
                        records: extraction.records,
                        failures: extraction.failures,
                    }
                }
            }
        };
        PageOutcome { page, state }
    }
}
