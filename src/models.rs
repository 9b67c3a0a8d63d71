//! Data models for search queries and the article records extracted from result pages.
//!
//! This module defines the values that cross component boundaries:
//! - [`SearchQuery`]: The validated keyword / sort / page-limit triple
//! - [`SortMode`]: Result ordering understood by the site's search endpoint
//! - [`ArticleRecord`]: One extracted search hit, independent of its source markup
//! - [`SearchOutcome`]: The ordered records of a run plus the accounting of what was skipped

use crate::error::ConfigError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result ordering accepted by the search endpoint's `sort` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortMode {
    /// Most liked first.
    #[default]
    Like,
    /// Most stocked first.
    Stock,
    /// Newest first.
    Created,
    /// Best match first.
    Rel,
}

impl SortMode {
    /// The literal value sent as `sort=<mode>`.
    pub fn as_param(self) -> &'static str {
        match self {
            SortMode::Like => "like",
            SortMode::Stock => "stock",
            SortMode::Created => "created",
            SortMode::Rel => "rel",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// A validated search request.
///
/// The keyword is split on whitespace into terms when the query is built, so a
/// query that exists is guaranteed to have at least one term and a page limit
/// of at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
    sort: SortMode,
    page_limit: u32,
}

impl SearchQuery {
    /// Build a query, failing fast on an empty keyword or a non-positive limit.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyKeyword`] if `keyword` contains no non-whitespace text
    /// - [`ConfigError::NonPositiveLimit`] if `page_limit <= 0`
    /// - [`ConfigError::LimitTooLarge`] if `page_limit` does not fit a page number
    pub fn new(keyword: &str, sort: SortMode, page_limit: i64) -> Result<Self, ConfigError> {
        let terms: Vec<String> = keyword.split_whitespace().map(str::to_owned).collect();
        if terms.is_empty() {
            return Err(ConfigError::EmptyKeyword);
        }
        if page_limit <= 0 {
            return Err(ConfigError::NonPositiveLimit(page_limit));
        }
        let page_limit =
            u32::try_from(page_limit).map_err(|_| ConfigError::LimitTooLarge(page_limit))?;

        Ok(Self {
            terms,
            sort,
            page_limit,
        })
    }

    /// Keyword terms in the order they were given.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Terms joined with `+`, each term percent-encoded, ready for `q=`.
    ///
    /// Plain ASCII words pass through unchanged; reserved characters do not
    /// (`c++` becomes `c%2B%2B`, so a literal `+` is not read as a separator).
    pub fn encoded_keyword(&self) -> String {
        self.terms
            .iter()
            .map(|t| urlencoding::encode(t))
            .collect::<Vec<_>>()
            .join("+")
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Highest page number that may ever be requested.
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }
}

/// One search hit extracted from a result block.
///
/// # Fields
///
/// * `title` - Visible text of the title anchor
/// * `url` - Absolute article URL
/// * `tags` - Tag names in list order (may be empty)
/// * `snippet` - Snippet text with every newline character removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub snippet: String,
}

/// Result of one pipeline run.
///
/// `records` is ordered by page number, then by document order within a page.
/// Failures that were recovered locally are accounted for here rather than
/// surfaced as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Extracted records, page 1 first.
    pub records: Vec<ArticleRecord>,
    /// Pages whose fetch completed (successfully or not).
    pub pages_fetched: u32,
    /// Pages whose fetch failed and therefore contributed no records.
    pub failed_pages: Vec<u32>,
    /// Article blocks that could not be turned into a record.
    pub failed_fragments: usize,
    /// Sequential mode saw an empty page before reaching the limit.
    pub reached_end: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_terms_joined_with_plus() {
        let q = SearchQuery::new("foo bar baz", SortMode::Like, 1).unwrap();
        assert_eq!(q.encoded_keyword(), "foo+bar+baz");
    }

    #[test]
    fn test_single_word_keyword_unchanged() {
        let q = SearchQuery::new("rust", SortMode::Like, 1).unwrap();
        assert_eq!(q.encoded_keyword(), "rust");
        assert_eq!(q.terms(), &["rust".to_string()]);
    }

    #[test]
    fn test_keyword_runs_of_whitespace_collapse_to_one_separator() {
        let q = SearchQuery::new("  tokio\t async  ", SortMode::Stock, 2).unwrap();
        assert_eq!(q.encoded_keyword(), "tokio+async");
    }

    #[test]
    fn test_keyword_terms_are_percent_encoded() {
        let q = SearchQuery::new("c++ 日本", SortMode::Like, 1).unwrap();
        assert_eq!(q.encoded_keyword(), "c%2B%2B+%E6%97%A5%E6%9C%AC");
    }

    #[test]
    fn test_empty_keyword_rejected() {
        assert!(matches!(
            SearchQuery::new("", SortMode::Like, 1),
            Err(ConfigError::EmptyKeyword)
        ));
        assert!(matches!(
            SearchQuery::new("   ", SortMode::Like, 1),
            Err(ConfigError::EmptyKeyword)
        ));
    }

    #[test]
    fn test_non_positive_limit_rejected() {
        assert!(matches!(
            SearchQuery::new("rust", SortMode::Like, 0),
            Err(ConfigError::NonPositiveLimit(0))
        ));
        assert!(matches!(
            SearchQuery::new("rust", SortMode::Like, -3),
            Err(ConfigError::NonPositiveLimit(-3))
        ));
    }

    #[test]
    fn test_oversized_limit_rejected() {
        let too_big = i64::from(u32::MAX) + 1;
        assert!(matches!(
            SearchQuery::new("rust", SortMode::Like, too_big),
            Err(ConfigError::LimitTooLarge(_))
        ));
    }

    #[test]
    fn test_sort_mode_params() {
        assert_eq!(SortMode::default(), SortMode::Like);
        assert_eq!(SortMode::Like.as_param(), "like");
        assert_eq!(SortMode::Stock.to_string(), "stock");
        assert_eq!(SortMode::Created.as_param(), "created");
        assert_eq!(SortMode::Rel.as_param(), "rel");
    }
}
