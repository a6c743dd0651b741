//! # Wikiroute
//!
//! Finds a route of hyperlinks from one encyclopedia page to another and
//! annotates every hop with the sentence the link appeared in.
//!
//! The crate is built from small pieces:
//!
//! - **Sentence extraction**: split a paragraph into sentences and pick the one
//!   containing a link's anchor text
//! - **Page expansion**: fetch a page, parse it and list its in-scope links,
//!   each with its context sentence
//! - **Route search**: depth-first (or breadth-first) search over the lazily
//!   discovered link graph with a depth bound and a visited set
//! - **Formatting**: render a route as numbered hops
//!
//! Fetching, markup parsing and sentence splitting sit behind the
//! [`fetch::Fetcher`], [`markup::MarkupParser`] and
//! [`sentence::SentenceTokenizer`] traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wikiroute::prelude::*;
//!
//! let finder = RouteFinder::from_config(&RouteFinderConfig::default())?;
//! let route = finder
//!     .find_route(
//!         "https://en.wikipedia.org/wiki/Rust_(programming_language)",
//!         "https://en.wikipedia.org/wiki/Graph_theory",
//!     )
//!     .await?;
//! println!("{route}");
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod address;
pub mod cancellation;
pub mod config;
pub mod errors;
pub mod expander;
pub mod fetch;
pub mod format;
pub mod markup;
pub mod observability;
pub mod route;
pub mod search;
pub mod sentence;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::Address;
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{
        ExpansionConfig, FetchConfig, FrontierOrder, RouteFinderConfig, SearchConfig,
    };
    pub use crate::errors::{
        FetchError, InvalidAddressError, NoMatchError, RouteError, RouteNotFoundError,
        SearchLimit, SearchLimitError,
    };
    pub use crate::expander::{DiscoveredLink, LinkExpander, PageExpander};
    #[cfg(feature = "http")]
    pub use crate::fetch::HttpFetcher;
    pub use crate::fetch::{FetchResult, Fetcher};
    pub use crate::format::{format_route, RouteFormatter};
    pub use crate::markup::{HtmlParser, MarkupParser, NodeTree};
    pub use crate::observability::{
        init_logging, LogConfig, LoggingSearchObserver, NoOpSearchObserver, SearchObserver,
    };
    pub use crate::route::{Hop, Route, SearchStats, SentenceIndex};
    pub use crate::search::RouteFinder;
    pub use crate::sentence::{RuleBasedTokenizer, SentenceExtractor, SentenceTokenizer};
}
