//! Markup-to-record extraction for one fixed search-result layout.
//!
//! A result page contains one `div.searchResult` block per article:
//!
//! ```text
//! div.searchResult
//! ├── h1.searchResult_itemTitle > a[href]      title + relative link
//! ├── ul.list-unstyled.list-inline.tagList
//! │   └── li > a                               one per tag
//! └── div.searchResult_snippet                 snippet text
//! ```
//!
//! The extraction rules only need "first / all descendants with this tag and
//! class", so they are written against [`QueryableNode`] rather than a
//! particular parser. [`scraper::ElementRef`] implements it.

use crate::error::{BlockElement, ExtractionError};
use crate::models::ArticleRecord;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

/// Tag name plus whitespace-separated classes that must all be present.
/// An empty `class` matches any element with the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeQuery {
    pub tag: &'static str,
    pub class: &'static str,
}

const RESULT_BLOCK: NodeQuery = NodeQuery {
    tag: "div",
    class: "searchResult",
};
const TITLE_HEADING: NodeQuery = NodeQuery {
    tag: "h1",
    class: "searchResult_itemTitle",
};
const ANCHOR: NodeQuery = NodeQuery { tag: "a", class: "" };
const TAG_LIST: NodeQuery = NodeQuery {
    tag: "ul",
    class: "list-unstyled list-inline tagList",
};
const TAG_ITEM: NodeQuery = NodeQuery { tag: "li", class: "" };
const SNIPPET: NodeQuery = NodeQuery {
    tag: "div",
    class: "searchResult_snippet",
};

/// Structured-tree queries needed by the extraction rules.
pub trait QueryableNode: Sized {
    /// First descendant (excluding `self`) matching `query`, in document order.
    fn find_first(&self, query: &NodeQuery) -> Option<Self>;

    /// All descendants (excluding `self`) matching `query`, in document order.
    fn find_all(&self, query: &NodeQuery) -> Vec<Self>;

    /// Direct element children matching `query`.
    fn find_children(&self, query: &NodeQuery) -> Vec<Self>;

    fn attr(&self, name: &str) -> Option<String>;

    /// Concatenation of every descendant text node, unmodified.
    fn text_content(&self) -> String;
}

fn matches(element: &ElementRef<'_>, query: &NodeQuery) -> bool {
    let value = element.value();
    value.name() == query.tag
        && query
            .class
            .split_whitespace()
            .all(|wanted| value.classes().any(|c| c == wanted))
}

impl<'a> QueryableNode for ElementRef<'a> {
    fn find_first(&self, query: &NodeQuery) -> Option<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|e| matches(e, query))
    }

    fn find_all(&self, query: &NodeQuery) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|e| matches(e, query))
            .collect()
    }

    fn find_children(&self, query: &NodeQuery) -> Vec<Self> {
        self.children()
            .filter_map(ElementRef::wrap)
            .filter(|e| matches(e, query))
            .collect()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_owned)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}

/// Every result block under `root`, in document order. An empty vector means
/// the page has no (more) results.
pub fn list_article_blocks<N: QueryableNode>(root: &N) -> Vec<N> {
    root.find_all(&RESULT_BLOCK)
}

/// What one page yielded.
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Result blocks found, whether or not they converted.
    pub block_count: usize,
    /// Records from the blocks that converted, in document order.
    pub records: Vec<ArticleRecord>,
    /// One entry per block that did not convert.
    pub failures: Vec<ExtractionError>,
}

impl PageExtraction {
    /// No result blocks at all, i.e. past the last page of results.
    pub fn is_empty(&self) -> bool {
        self.block_count == 0
    }
}

/// Converts result blocks into [`ArticleRecord`]s, resolving links against the site root.
#[derive(Debug, Clone)]
pub struct Extractor {
    base: Url,
}

impl Extractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Parse a whole page and convert each block, skipping the ones that fail.
    pub fn extract_page(&self, markup: &str) -> PageExtraction {
        let document = Html::parse_document(markup);
        self.extract_blocks(&document.root_element())
    }

    pub fn extract_blocks<N: QueryableNode>(&self, root: &N) -> PageExtraction {
        let blocks = list_article_blocks(root);
        let mut extraction = PageExtraction {
            block_count: blocks.len(),
            ..PageExtraction::default()
        };

        for (index, block) in blocks.iter().enumerate() {
            match self.to_record(block) {
                Ok(record) => extraction.records.push(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed result block");
                    extraction.failures.push(e);
                }
            }
        }

        debug!(
            blocks = extraction.block_count,
            records = extraction.records.len(),
            "Extracted page"
        );
        extraction
    }

    /// Convert one result block.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::Missing`] names the first required sub-element that
    /// is absent; [`ExtractionError::InvalidUrl`] if the link cannot be resolved.
    pub fn to_record<N: QueryableNode>(
        &self,
        fragment: &N,
    ) -> Result<ArticleRecord, ExtractionError> {
        let (url, title) = self.title_and_url(fragment)?;
        let tags = tags(fragment)?;
        let snippet = snippet(fragment)?;
        Ok(ArticleRecord {
            title,
            url,
            tags,
            snippet,
        })
    }

    fn title_and_url<N: QueryableNode>(
        &self,
        fragment: &N,
    ) -> Result<(String, String), ExtractionError> {
        let heading = fragment
            .find_first(&TITLE_HEADING)
            .ok_or(ExtractionError::Missing(BlockElement::TitleHeading))?;
        let anchor = heading
            .find_first(&ANCHOR)
            .ok_or(ExtractionError::Missing(BlockElement::TitleAnchor))?;
        let href = anchor
            .attr("href")
            .ok_or(ExtractionError::Missing(BlockElement::AnchorHref))?;
        let url = self
            .base
            .join(&href)
            .map_err(|source| ExtractionError::InvalidUrl { href, source })?;
        Ok((url.to_string(), anchor.text_content()))
    }
}

fn tags<N: QueryableNode>(fragment: &N) -> Result<Vec<String>, ExtractionError> {
    let list = fragment
        .find_first(&TAG_LIST)
        .ok_or(ExtractionError::Missing(BlockElement::TagList))?;
    Ok(list
        .find_all(&TAG_ITEM)
        .iter()
        .flat_map(|item| item.find_children(&ANCHOR))
        .map(|a| a.text_content())
        .collect())
}

// Newlines are removed outright, not replaced with spaces.
fn snippet<N: QueryableNode>(fragment: &N) -> Result<String, ExtractionError> {
    let container = fragment
        .find_first(&SNIPPET)
        .ok_or(ExtractionError::Missing(BlockElement::Snippet))?;
    Ok(container.text_content().replace('\n', ""))
}
