//! End-to-end search: validate the request, paginate, flatten records in page order.

use crate::error::PipelineError;
use crate::fetcher::PageSource;
use crate::models::{SearchOutcome, SearchQuery, SortMode};
use crate::paginator::{Mode, PageState, Pagination, Paginator};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Unvalidated input from the caller.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub keyword: String,
    pub sort: SortMode,
    /// Signed so that non-positive values can be rejected with a
    /// [`ConfigError`](crate::error::ConfigError).
    pub page_limit: i64,
    pub mode: Mode,
}

pub struct Pipeline<S> {
    source: S,
    paginator: Paginator,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, paginator: Paginator) -> Self {
        Self { source, paginator }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one search.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Config`] for an invalid keyword or page limit; no
    ///   request has been made in that case
    /// - [`PipelineError::Cancelled`] if `cancel` fired, carrying whatever was
    ///   collected before it did
    ///
    /// Failed pages and malformed result blocks are not errors; they are
    /// counted in the returned [`SearchOutcome`].
    #[instrument(level = "info", skip_all, fields(keyword = %request.keyword, mode = ?request.mode))]
    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, PipelineError> {
        let query = SearchQuery::new(&request.keyword, request.sort, request.page_limit)?;
        self.run(&query, request.mode, cancel).await
    }

    /// Run a search for an already validated query.
    pub async fn run(
        &self,
        query: &SearchQuery,
        mode: Mode,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, PipelineError> {
        info!(
            keyword = %query.encoded_keyword(),
            sort = %query.sort(),
            limit = query.page_limit(),
            ?mode,
            "Starting search"
        );

        let pagination = self.paginator.run(&self.source, query, mode, cancel).await;
        let cancelled = pagination.cancelled;
        let outcome = flatten(pagination);

        if !outcome.failed_pages.is_empty() || outcome.failed_fragments > 0 {
            warn!(
                failed_pages = ?outcome.failed_pages,
                failed_fragments = outcome.failed_fragments,
                "Search completed with skipped content"
            );
        }

        if cancelled {
            return Err(PipelineError::Cancelled { partial: outcome });
        }

        info!(
            records = outcome.records.len(),
            pages = outcome.pages_fetched,
            "Search finished"
        );
        Ok(outcome)
    }
}

/// Concatenate per-page records in ascending page order and total up the failures.
fn flatten(pagination: Pagination) -> SearchOutcome {
    let mut outcome = SearchOutcome {
        reached_end: pagination.reached_end,
        ..SearchOutcome::default()
    };

    let mut pages = pagination.pages;
    pages.sort_by_key(|p| p.page);

    for page in pages {
        outcome.pages_fetched += 1;
        match page.state {
            PageState::Parsed { records, failures } => {
                outcome.failed_fragments += failures.len();
                outcome.records.extend(records);
            }
            PageState::FetchFailed(_) => outcome.failed_pages.push(page.page),
            PageState::Empty => {}
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;
    use crate::testing::{MockSource, block, block_without_tags, numbered_page, page};
    use reqwest::StatusCode;
    use std::time::Duration;

    fn pipeline(source: MockSource) -> Pipeline<MockSource> {
        let paginator = Paginator::new(&ScraperConfig {
            request_interval_ms: 0,
            ..ScraperConfig::default()
        })
        .unwrap();
        Pipeline::new(source, paginator)
    }

    fn request(keyword: &str, page_limit: i64, mode: Mode) -> SearchRequest {
        SearchRequest {
            keyword: keyword.to_string(),
            sort: SortMode::Like,
            page_limit,
            mode,
        }
    }

    #[tokio::test]
    async fn test_invalid_requests_make_no_calls() {
        let p = pipeline(MockSource::new().markup(1, numbered_page(1, 1), Duration::ZERO));
        let cancel = CancellationToken::new();

        for req in [
            request("", 3, Mode::Bounded),
            request("   ", 3, Mode::Sequential),
            request("rust", 0, Mode::Bounded),
            request("rust", -1, Mode::Sequential),
        ] {
            let err = p.search(&req, &cancel).await.unwrap_err();
            assert!(matches!(err, PipelineError::Config(_)), "{req:?}");
        }
        assert!(p.source().calls().is_empty());
    }

    #[tokio::test]
    async fn test_outcome_accounts_for_skipped_content() {
        let source = MockSource::new()
            .markup(
                1,
                page(&[
                    block("a", "/a", &["x"], "one"),
                    block_without_tags("b", "/b", "two"),
                    block("c", "/c", &[], "three"),
                ]),
                Duration::ZERO,
            )
            .failure(2, StatusCode::BAD_GATEWAY)
            .markup(3, numbered_page(3, 1), Duration::ZERO);

        let outcome = pipeline(source)
            .search(&request("rust", 3, Mode::Bounded), &CancellationToken::new())
            .await
            .unwrap();

        let titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c", "p3-a0"]);
        assert_eq!(outcome.pages_fetched, 3);
        assert_eq!(outcome.failed_pages, vec![2]);
        assert_eq!(outcome.failed_fragments, 1);
        assert!(!outcome.reached_end);
    }

    #[tokio::test]
    async fn test_sequential_reports_reached_end() {
        let source = MockSource::new()
            .markup(1, numbered_page(1, 2), Duration::ZERO)
            .markup(2, numbered_page(2, 2), Duration::ZERO);

        let p = pipeline(source);
        let outcome = p
            .search(&request("rust", 5, Mode::Sequential), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 4);
        assert_eq!(outcome.pages_fetched, 3);
        assert!(outcome.reached_end);
        assert_eq!(p.source().calls(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_cancellation_is_distinct_from_completion() {
        let source = MockSource::new()
            .markup(1, numbered_page(1, 1), Duration::ZERO)
            .markup(2, numbered_page(2, 1), Duration::from_secs(30));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = pipeline(source)
            .search(&request("rust", 2, Mode::Bounded), &cancel)
            .await
            .unwrap_err();

        match err {
            PipelineError::Cancelled { partial } => {
                assert_eq!(partial.records.len(), 1);
                assert_eq!(partial.records[0].title, "p1-a0");
                assert_eq!(partial.pages_fetched, 1);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[test]
    fn test_flatten_sorts_pages() {
        use crate::models::ArticleRecord;
        use crate::paginator::PageOutcome;

        let record = |t: &str| ArticleRecord {
            title: t.to_string(),
            url: String::new(),
            tags: Vec::new(),
            snippet: String::new(),
        };
        let pagination = Pagination {
            pages: vec![
                PageOutcome {
                    page: 2,
                    state: PageState::Parsed {
                        records: vec![record("second")],
                        failures: Vec::new(),
                    },
                },
                PageOutcome {
                    page: 1,
                    state: PageState::Parsed {
                        records: vec![record("first")],
                        failures: Vec::new(),
                    },
                },
            ],
            ..Pagination::default()
        };

        let titles: Vec<String> = flatten(pagination)
            .records
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
    }
}
