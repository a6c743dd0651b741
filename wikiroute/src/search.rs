//! Route search over the lazily discovered link graph.
//!
//! The engine keeps a frontier of `(address, path)` entries and a visited
//! set. Each popped entry is checked against the target first, then pruned
//! if it was already expanded or its path is already `max_depth` hops long;
//! otherwise it is expanded and every discovered link is pushed with the
//! path extended by that link. Depth is checked on pop, so the frontier may
//! briefly hold entries that will never be expanded.
//!
//! With [`FrontierOrder::DepthFirst`] the last discovered link is explored
//! first and the route found is not necessarily the shortest one.
//! [`FrontierOrder::BreadthFirst`] finds a route with the fewest hops.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::address::Address;
use crate::cancellation::CancellationToken;
use crate::config::{FrontierOrder, SearchConfig};
use crate::errors::{RouteError, RouteNotFoundError, SearchLimit, SearchLimitError};
use crate::expander::LinkExpander;
use crate::observability::{LoggingSearchObserver, PruneReason, SearchObserver};
use crate::route::{Route, SearchStats, SentenceIndex};

#[cfg(feature = "http")]
use crate::{config::RouteFinderConfig, expander::PageExpander, fetch::HttpFetcher};

#[derive(Debug)]
struct FrontierEntry {
    address: Address,
    path: Vec<Address>,
}

#[derive(Debug)]
struct Frontier {
    entries: VecDeque<FrontierEntry>,
    order: FrontierOrder,
}

impl Frontier {
    fn new(order: FrontierOrder) -> Self {
        Self {
            entries: VecDeque::new(),
            order,
        }
    }

    fn push(&mut self, entry: FrontierEntry) {
        self.entries.push_back(entry);
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        match self.order {
            FrontierOrder::DepthFirst => self.entries.pop_back(),
            FrontierOrder::BreadthFirst => self.entries.pop_front(),
        }
    }
}

/// Everything one search owns.
struct SearchState {
    frontier: Frontier,
    visited: HashSet<Address>,
    index: SentenceIndex,
    stats: SearchStats,
    started: Instant,
}

impl SearchState {
    fn new(start: &Address, order: FrontierOrder) -> Self {
        let mut frontier = Frontier::new(order);
        frontier.push(FrontierEntry {
            address: start.clone(),
            path: Vec::new(),
        });
        Self {
            frontier,
            visited: HashSet::new(),
            index: SentenceIndex::new(),
            stats: SearchStats::default(),
            started: Instant::now(),
        }
    }

    fn finish_stats(&mut self) -> SearchStats {
        self.stats.elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.stats.completed_at = Utc::now();
        self.stats.clone()
    }
}

/// Finds hyperlink routes between pages.
#[derive(Clone)]
pub struct RouteFinder {
    expander: Arc<dyn LinkExpander>,
    config: SearchConfig,
    strip_fragments: bool,
    observer: Arc<dyn SearchObserver>,
}

impl RouteFinder {
    /// Creates a finder over any expander, logging progress through `tracing`.
    #[must_use]
    pub fn new(expander: Arc<dyn LinkExpander>, config: SearchConfig) -> Self {
        Self {
            expander,
            config,
            strip_fragments: true,
            observer: Arc::new(LoggingSearchObserver),
        }
    }

    /// Builds a finder that fetches live pages over HTTP.
    #[cfg(feature = "http")]
    pub fn from_config(config: &RouteFinderConfig) -> Result<Self, RouteError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.fetch.clone())?;
        let expander = PageExpander::new(Arc::new(fetcher), config.expansion.clone(), &config.fetch)?;
        Ok(Self::new(Arc::new(expander), config.search.clone())
            .with_strip_fragments(config.expansion.strip_fragments))
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Whether fragments are removed from the start and target before
    /// comparing them with discovered addresses.
    #[must_use]
    pub fn with_strip_fragments(mut self, strip: bool) -> Self {
        self.strip_fragments = strip;
        self
    }

    /// Gets the search configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Parses both addresses and searches for a route between them.
    pub async fn find_route(&self, from: &str, to: &str) -> Result<Route, RouteError> {
        let start = Address::parse(from)?;
        let target = Address::parse(to)?;
        self.search(&start, &target, &CancellationToken::new()).await
    }

    /// Searches for a route from `start` to `target`.
    ///
    /// Ends with [`RouteError::RouteNotFound`] when the frontier runs dry,
    /// [`RouteError::SearchLimitReached`] when a configured limit is hit and
    /// [`RouteError::Cancelled`] when `cancel` fires. Pages that fail to fetch
    /// are dead ends and never end the search.
    pub async fn search(
        &self,
        start: &Address,
        target: &Address,
        cancel: &CancellationToken,
    ) -> Result<Route, RouteError> {
        let (start, target) = if self.strip_fragments {
            (start.clone().without_fragment(), target.clone().without_fragment())
        } else {
            (start.clone(), target.clone())
        };

        let span = info_span!(
            "route_search",
            search_id = %Uuid::new_v4(),
            from = %start,
            to = %target,
            max_depth = self.config.max_depth,
        );

        async {
            let result = self.run(start, target, cancel).await;
            match &result {
                Ok(route) => self.observer.on_route_found(route),
                Err(error) => self.observer.on_search_failed(error),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        start: Address,
        target: Address,
        cancel: &CancellationToken,
    ) -> Result<Route, RouteError> {
        let base = start.base();
        let max_depth = self.config.max_depth;
        let time_limit = self.config.time_limit()?;
        let mut state = SearchState::new(&start, self.config.frontier_order);

        loop {
            cancel.check()?;
            if let Some(limit) = time_limit {
                if state.started.elapsed() >= limit {
                    return Err(SearchLimitError::new(
                        SearchLimit::TimeLimit(limit.as_secs_f64()),
                        state.stats.pages_expanded,
                    )
                    .into());
                }
            }

            let Some(FrontierEntry { address, path }) = state.frontier.pop() else {
                return Err(RouteNotFoundError::new(
                    start.as_str(),
                    target.as_str(),
                    max_depth,
                    state.stats.pages_expanded,
                )
                .into());
            };

            if address == target {
                let stats = state.finish_stats();
                return Ok(Route::from_path(start, target, &path, &state.index, stats));
            }

            let pruned = if state.visited.contains(&address) {
                Some(PruneReason::Visited)
            } else if path.len() >= max_depth {
                Some(PruneReason::OverDepth)
            } else {
                None
            };
            if let Some(reason) = pruned {
                state.stats.entries_pruned += 1;
                self.observer.on_entry_pruned(&address, reason);
                continue;
            }

            if let Some(max) = self.config.max_expansions {
                if state.stats.pages_expanded >= max {
                    return Err(SearchLimitError::new(SearchLimit::Expansions(max), state.stats.pages_expanded).into());
                }
            }

            state.visited.insert(address.clone());
            self.observer.on_visit(&address, path.len());

            let expansion = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(cancel.to_error()),
                result = self.expander.expand(&address, &base) => result,
            };
            state.stats.pages_expanded += 1;

            let links = match expansion {
                Ok(links) => links,
                Err(error) => {
                    state.stats.dead_ends += 1;
                    self.observer.on_dead_end(&address, &error);
                    continue;
                }
            };
            self.observer.on_page_expanded(&address, links.len());
            state.stats.links_discovered += links.len();

            for link in links {
                state.index.record(&link.address, link.sentence);
                let mut next = path.clone();
                next.push(link.address.clone());
                state.frontier.push(FrontierEntry {
                    address: link.address,
                    path: next,
                });
            }
        }
    }
}

impl std::fmt::Debug for RouteFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteFinder")
            .field("config", &self.config)
            .field("strip_fragments", &self.strip_fragments)
            .finish_non_exhaustive()
    }
}
