//! Error taxonomy for the search pipeline.
//!
//! Only [`ConfigError`] and [`PipelineError::Cancelled`] end a run. Fetch and
//! extraction failures are recovered where they happen and show up as counts
//! in [`SearchOutcome`](crate::models::SearchOutcome).

use crate::models::SearchOutcome;
use reqwest::StatusCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid input detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("keyword must contain at least one non-whitespace term")]
    EmptyKeyword,

    #[error("page limit must be positive, got {0}")]
    NonPositiveLimit(i64),

    #[error("page limit {0} is too large")]
    LimitTooLarge(i64),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("request timeout must be at least 1 second")]
    ZeroTimeout,

    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A single page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page {page}: request timed out")]
    Timeout {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("page {page}: request failed: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("page {page}: server responded with {status}")]
    Status { page: u32, status: StatusCode },
}

impl FetchError {
    /// Wrap a transport-level error, separating timeouts from other failures.
    pub fn from_reqwest(page: u32, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout { page, source }
        } else {
            FetchError::Transport { page, source }
        }
    }

    /// The page whose fetch failed.
    pub fn page(&self) -> u32 {
        match self {
            FetchError::Timeout { page, .. }
            | FetchError::Transport { page, .. }
            | FetchError::Status { page, .. } => *page,
        }
    }
}

/// Sub-elements every result block must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockElement {
    TitleHeading,
    TitleAnchor,
    AnchorHref,
    TagList,
    Snippet,
}

impl fmt::Display for BlockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockElement::TitleHeading => "title heading",
            BlockElement::TitleAnchor => "title anchor",
            BlockElement::AnchorHref => "title anchor href",
            BlockElement::TagList => "tag list",
            BlockElement::Snippet => "snippet",
        };
        f.write_str(name)
    }
}

/// A result block could not be turned into a record.
#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("result block has no {0}")]
    Missing(BlockElement),

    #[error("cannot resolve article link {href:?}: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// Terminal outcome of a pipeline run that did not complete.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The caller's cancellation signal fired. Pages that finished before the
    /// signal are still in `partial`.
    #[error("search cancelled after {} page(s); {} record(s) collected", .partial.pages_fetched, .partial.records.len())]
    Cancelled { partial: SearchOutcome },
}
