//! Page expansion: from an address to its in-scope outbound links.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::address::Address;
use crate::config::{ExpansionConfig, FetchConfig};
use crate::errors::{FetchError, RouteError};
use crate::fetch::Fetcher;
use crate::markup::{HtmlParser, HyperlinkNode, MarkupParser};
use crate::sentence::{SentenceExtractor, SentenceTokenizer};

/// An in-scope link found on a page, with the sentence it appeared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredLink {
    /// Absolute address the link points to.
    pub address: Address,
    /// The link's anchor text.
    pub anchor_text: String,
    /// The sentence of the enclosing paragraph that contains the anchor text.
    pub sentence: String,
}

impl DiscoveredLink {
    /// Creates a discovered link.
    #[must_use]
    pub fn new(address: Address, anchor_text: impl Into<String>, sentence: impl Into<String>) -> Self {
        Self {
            address,
            anchor_text: anchor_text.into(),
            sentence: sentence.into(),
        }
    }
}

/// Protocol for expanding a page into its outbound links.
///
/// Implementations are stateless; every piece of search bookkeeping belongs
/// to the caller.
#[async_trait]
pub trait LinkExpander: Send + Sync {
    /// Returns the in-scope links of `address`, in document order, resolved
    /// against `base`. A fetch failure makes the page a dead end.
    async fn expand(&self, address: &Address, base: &Address) -> Result<Vec<DiscoveredLink>, FetchError>;
}

/// Expander that fetches, parses and extracts context sentences.
#[derive(Clone)]
pub struct PageExpander {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn MarkupParser>,
    extractor: SentenceExtractor,
    config: ExpansionConfig,
    timeout: Duration,
}

impl PageExpander {
    /// Creates an expander with the default HTML parser and tokenizer.
    ///
    /// Fails when the fetch timeout is not a usable duration.
    pub fn new(fetcher: Arc<dyn Fetcher>, config: ExpansionConfig, fetch: &FetchConfig) -> Result<Self, RouteError> {
        Ok(Self {
            fetcher,
            parser: Arc::new(HtmlParser),
            extractor: SentenceExtractor::default(),
            config,
            timeout: fetch.timeout()?,
        })
    }

    /// Replaces the markup parser.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn MarkupParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the sentence tokenizer.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn SentenceTokenizer>) -> Self {
        self.extractor = SentenceExtractor::new(tokenizer);
        self
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Extracts in-scope links from already fetched markup.
    #[must_use]
    pub fn links_in(&self, raw: &str, base: &Address) -> Vec<DiscoveredLink> {
        let tree = self.parser.parse(raw);
        tree.hyperlinks()
            .iter()
            .filter_map(|link| self.discover(link, base))
            .collect()
    }

    fn discover(&self, link: &HyperlinkNode, base: &Address) -> Option<DiscoveredLink> {
        let href = link.href();
        if link.text().trim().is_empty() || !href.starts_with(&self.config.link_prefix) {
            return None;
        }
        let paragraph = link
            .parent()
            .filter(|parent| parent.tag().eq_ignore_ascii_case(&self.config.paragraph_tag))?;

        let address = match base.join(href) {
            Ok(address) if self.config.strip_fragments => address.without_fragment(),
            Ok(address) => address,
            Err(err) => {
                debug!(href = %href, error = %err, "Skipping unresolvable link");
                return None;
            }
        };

        let sentence = self.extractor.extract(link.text(), paragraph.text()).ok()?;
        Some(DiscoveredLink::new(address, link.text(), sentence))
    }
}

#[async_trait]
impl LinkExpander for PageExpander {
    async fn expand(&self, address: &Address, base: &Address) -> Result<Vec<DiscoveredLink>, FetchError> {
        let page = self.fetcher.fetch(address, self.timeout).await?;
        if !page.is_success() {
            return Err(FetchError::status(address.as_str(), page.status_code));
        }
        // Pages without a declared type are parsed anyway.
        if let Some(content_type) = page.content_type.as_deref().filter(|_| !page.is_html()) {
            return Err(FetchError::new(
                address.as_str(),
                format!("unsupported content type '{content_type}'"),
            ));
        }

        let links = self.links_in(&page.text, base);
        debug!(
            url = %address,
            final_url = %page.final_url,
            duration_ms = page.duration_ms,
            links = links.len(),
            "Expanded page"
        );
        Ok(links)
    }
}

impl std::fmt::Debug for PageExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageExpander")
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
