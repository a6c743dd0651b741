//! Canned pages and a fetcher that serves them.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::address::Address;
use crate::errors::FetchError;
use crate::fetch::{FetchResult, Fetcher};

/// Builds an HTML document whose body is one `<p>` per paragraph.
///
/// Paragraphs are inserted verbatim, so they may contain links built with
/// [`wiki_link`].
#[must_use]
pub fn wiki_page(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|paragraph| format!("<p>{paragraph}</p>\n"))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html><head><title>{title}</title></head>\n<body>\n\
         <div id=\"navigation\"><a href=\"/wiki/Main_Page\">Main page</a></div>\n\
         <h1>{title}</h1>\n{body}</body></html>"
    )
}

/// Builds an in-scope anchor to `/wiki/{target}` with the given text.
#[must_use]
pub fn wiki_link(target: &str, text: &str) -> String {
    format!("<a href=\"/wiki/{target}\">{text}</a>")
}

/// Fetcher serving pages from memory. Unknown addresses answer with a 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Creates a fetcher with no pages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page served at `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Every requested URL, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// How many times `url` was requested.
    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, address: &Address, _timeout: Duration) -> Result<FetchResult, FetchError> {
        self.requests.lock().push(address.as_str().to_string());
        self.pages
            .get(address.as_str())
            .map(|html| FetchResult::html(address.as_str(), html.clone()))
            .ok_or_else(|| FetchError::status(address.as_str(), 404))
    }
}
