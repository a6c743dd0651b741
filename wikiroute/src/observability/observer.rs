//! Hooks for watching a search make progress.

use std::fmt;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::errors::{FetchError, RouteError};
use crate::route::Route;

/// Why a popped frontier entry was discarded without expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    /// The address was already expanded.
    Visited,
    /// The entry's path already has the maximum number of hops.
    OverDepth,
}

impl PruneReason {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visited => "visited",
            Self::OverDepth => "over_depth",
        }
    }
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives search progress. Every method has an empty default.
pub trait SearchObserver: Send + Sync {
    /// An address is about to be expanded; `depth` is its hop count from the start.
    fn on_visit(&self, _address: &Address, _depth: usize) {}

    /// An expansion returned `links` in-scope links.
    fn on_page_expanded(&self, _address: &Address, _links: usize) {}

    /// An expansion failed to fetch; the address is a dead end.
    fn on_dead_end(&self, _address: &Address, _error: &FetchError) {}

    /// A popped entry was discarded.
    fn on_entry_pruned(&self, _address: &Address, _reason: PruneReason) {}

    /// The target was reached.
    fn on_route_found(&self, _route: &Route) {}

    /// The search ended without a route.
    fn on_search_failed(&self, _error: &RouteError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSearchObserver;

impl SearchObserver for NoOpSearchObserver {}

/// Observer that reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSearchObserver;

impl SearchObserver for LoggingSearchObserver {
    fn on_visit(&self, address: &Address, depth: usize) {
        info!(depth, "Visited the {address} URL...");
    }

    fn on_page_expanded(&self, address: &Address, links: usize) {
        debug!(url = %address, links, "Page expanded");
    }

    fn on_dead_end(&self, address: &Address, error: &FetchError) {
        warn!(
            url = %address,
            status_code = ?error.status_code,
            timed_out = error.timed_out,
            "Dead end: {}",
            error.reason
        );
    }

    fn on_entry_pruned(&self, address: &Address, reason: PruneReason) {
        debug!(url = %address, reason = %reason, "Entry pruned");
    }

    fn on_route_found(&self, route: &Route) {
        info!(
            hops = route.len(),
            pages_expanded = route.stats.pages_expanded,
            elapsed_ms = route.stats.elapsed_ms,
            "Route found"
        );
    }

    fn on_search_failed(&self, error: &RouteError) {
        if error.is_route_not_found() {
            info!(error = %error, "No route found");
        } else {
            warn!(kind = error.kind(), error = %error, "Search failed");
        }
    }
}
