//! Scripted expander and a recording observer.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::address::Address;
use crate::errors::{FetchError, RouteError};
use crate::expander::{DiscoveredLink, LinkExpander};
use crate::observability::{PruneReason, SearchObserver};
use crate::route::Route;

/// Expander backed by an in-memory link graph.
///
/// Addresses with no outgoing links configured expand to nothing; addresses
/// marked as failing expand to a [`FetchError`].
#[derive(Debug, Default)]
pub struct StaticLinkExpander {
    graph: HashMap<Address, Vec<DiscoveredLink>>,
    failing: HashSet<Address>,
    delay: Option<Duration>,
    expansions: Mutex<Vec<Address>>,
}

impl StaticLinkExpander {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the outgoing links of `from`, in document order.
    #[must_use]
    pub fn with_links(mut self, from: Address, links: Vec<DiscoveredLink>) -> Self {
        self.graph.insert(from, links);
        self
    }

    /// Makes every expansion of `address` fail.
    #[must_use]
    pub fn with_failure(mut self, address: Address) -> Self {
        self.failing.insert(address);
        self
    }

    /// Sleeps before every expansion.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every expanded address, in expansion order.
    #[must_use]
    pub fn expansions(&self) -> Vec<Address> {
        self.expansions.lock().clone()
    }

    /// Number of expansions performed.
    #[must_use]
    pub fn expansion_count(&self) -> usize {
        self.expansions.lock().len()
    }
}

#[async_trait]
impl LinkExpander for StaticLinkExpander {
    async fn expand(&self, address: &Address, _base: &Address) -> Result<Vec<DiscoveredLink>, FetchError> {
        self.expansions.lock().push(address.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(address) {
            return Err(FetchError::status(address.as_str(), 500));
        }
        Ok(self.graph.get(address).cloned().unwrap_or_default())
    }
}

/// A captured search event.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    /// An address was expanded at the given depth.
    Visit(Address, usize),
    /// An expansion returned this many links.
    Expanded(Address, usize),
    /// An expansion failed.
    DeadEnd(Address),
    /// A popped entry was discarded.
    Pruned(Address, PruneReason),
    /// A route with this many hops was found.
    Found(usize),
    /// The search failed with this error kind.
    Failed(&'static str),
}

/// Observer that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Addresses passed to `on_visit`, in order.
    #[must_use]
    pub fn visits(&self) -> Vec<Address> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::Visit(address, _) => Some(address.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: RecordedEvent) {
        self.events.lock().push(event);
    }
}

impl SearchObserver for RecordingObserver {
    fn on_visit(&self, address: &Address, depth: usize) {
        self.push(RecordedEvent::Visit(address.clone(), depth));
    }

    fn on_page_expanded(&self, address: &Address, links: usize) {
        self.push(RecordedEvent::Expanded(address.clone(), links));
    }

    fn on_dead_end(&self, address: &Address, _error: &FetchError) {
        self.push(RecordedEvent::DeadEnd(address.clone()));
    }

    fn on_entry_pruned(&self, address: &Address, reason: PruneReason) {
        self.push(RecordedEvent::Pruned(address.clone(), reason));
    }

    fn on_route_found(&self, route: &Route) {
        self.push(RecordedEvent::Found(route.len()));
    }

    fn on_search_failed(&self, error: &RouteError) {
        self.push(RecordedEvent::Failed(error.kind()));
    }
}
