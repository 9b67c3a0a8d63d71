//! Fixtures shared by unit tests: result-page markup builders and an
//! instrumented in-memory [`PageSource`].

use crate::error::FetchError;
use crate::fetcher::PageSource;
use crate::models::SearchQuery;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Markup for one well-formed result block.
pub fn block(title: &str, href: &str, tags: &[&str], snippet: &str) -> String {
    let tag_items: String = tags
        .iter()
        .map(|t| format!("<li><a href=\"/tags/{t}\">{t}</a></li>"))
        .collect();
    format!(
        r#"<div class="searchResult">
  <h1 class="searchResult_itemTitle"><a href="{href}">{title}</a></h1>
  <ul class="list-unstyled list-inline tagList">{tag_items}</ul>
  <div class="searchResult_snippet">{snippet}</div>
</div>"#
    )
}

/// Result block with no tag list container.
pub fn block_without_tags(title: &str, href: &str, snippet: &str) -> String {
    format!(
        r#"<div class="searchResult">
  <h1 class="searchResult_itemTitle"><a href="{href}">{title}</a></h1>
  <div class="searchResult_snippet">{snippet}</div>
</div>"#
    )
}

/// Wrap blocks in a full document.
pub fn page(blocks: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>search</title></head><body><main>{}</main></body></html>",
        blocks.concat()
    )
}

/// A page carrying `n` distinct blocks whose titles encode page and position.
pub fn numbered_page(page_no: u32, n: usize) -> String {
    let blocks: Vec<String> = (0..n)
        .map(|i| {
            block(
                &format!("p{page_no}-a{i}"),
                &format!("/u/items/{page_no}{i}"),
                &["rust"],
                "text",
            )
        })
        .collect();
    page(&blocks)
}

enum Reply {
    Markup(String),
    Fail(StatusCode),
}

/// In-memory source that records every request and how many were in flight.
///
/// Pages without a configured reply return an empty result page.
pub struct MockSource {
    replies: HashMap<u32, (Reply, Duration)>,
    calls: Mutex<Vec<u32>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn markup(mut self, page_no: u32, markup: String, delay: Duration) -> Self {
        self.replies.insert(page_no, (Reply::Markup(markup), delay));
        self
    }

    pub fn failure(mut self, page_no: u32, status: StatusCode) -> Self {
        self.replies.insert(page_no, (Reply::Fail(status), Duration::ZERO));
        self
    }

    /// Pages requested, in call order.
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl PageSource for MockSource {
    async fn fetch(&self, _query: &SearchQuery, page_no: u32) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(page_no);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match self.replies.get(&page_no) {
            Some((reply, delay)) => {
                tokio::time::sleep(*delay).await;
                match reply {
                    Reply::Markup(m) => Ok(m.clone()),
                    Reply::Fail(status) => Err(FetchError::Status {
                        page: page_no,
                        status: *status,
                    }),
                }
            }
            None => Ok(page(&[])),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
