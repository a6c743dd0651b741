//! Error types for route searches.
//!
//! Only [`RouteError::RouteNotFound`] is a legitimate terminal outcome of a
//! search. Fetch failures and sentence mismatches are recovered where they
//! occur and are represented here so collaborators can report them.

use std::collections::HashMap;
use thiserror::Error;

/// The main error type for wikiroute operations.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A page could not be fetched.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// A link's anchor text was not found in any sentence of its paragraph.
    #[error("{0}")]
    NoMatch(#[from] NoMatchError),

    /// The frontier was exhausted without reaching the target.
    #[error("{0}")]
    RouteNotFound(#[from] RouteNotFoundError),

    /// The search hit its expansion cap or wall-clock limit.
    #[error("{0}")]
    SearchLimitReached(#[from] SearchLimitError),

    /// The search was cancelled through its token.
    #[error("Search cancelled: {0}")]
    Cancelled(String),

    /// A start or target address could not be parsed.
    #[error("{0}")]
    InvalidAddress(#[from] InvalidAddressError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RouteError {
    /// Whether this is the "no route exists" outcome.
    #[must_use]
    pub fn is_route_not_found(&self) -> bool {
        matches!(self, Self::RouteNotFound(_))
    }

    /// Stable name of the error kind, used in structured output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "FetchError",
            Self::NoMatch(_) => "NoMatchError",
            Self::RouteNotFound(_) => "RouteNotFound",
            Self::SearchLimitReached(_) => "SearchLimitReached",
            Self::Cancelled(_) => "Cancelled",
            Self::InvalidAddress(_) => "InvalidAddress",
            Self::Config(_) => "ConfigError",
            Self::Serialization(_) => "SerializationError",
            Self::Io(_) => "IoError",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));

        match self {
            Self::Fetch(err) => {
                map.insert("url".to_string(), serde_json::json!(err.url));
                if let Some(status) = err.status_code {
                    map.insert("status_code".to_string(), serde_json::json!(status));
                }
            }
            Self::RouteNotFound(err) => {
                map.insert("from".to_string(), serde_json::json!(err.from));
                map.insert("to".to_string(), serde_json::json!(err.to));
                map.insert("max_depth".to_string(), serde_json::json!(err.max_depth));
                map.insert("pages_expanded".to_string(), serde_json::json!(err.pages_expanded));
            }
            Self::SearchLimitReached(err) => {
                map.insert("limit".to_string(), serde_json::json!(err.limit.to_string()));
                map.insert("pages_expanded".to_string(), serde_json::json!(err.pages_expanded));
            }
            Self::InvalidAddress(err) => {
                map.insert("input".to_string(), serde_json::json!(err.input));
            }
            _ => {}
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when a page cannot be fetched.
///
/// The search engine treats the address as a dead end.
#[derive(Debug, Clone, Error)]
#[error("Failed to fetch {url}: {reason}")]
pub struct FetchError {
    /// The address that was requested.
    pub url: String,
    /// Human-readable failure reason.
    pub reason: String,
    /// HTTP status code, when a response was received.
    pub status_code: Option<u16>,
    /// Whether the request ran past its timeout.
    pub timed_out: bool,
}

impl FetchError {
    /// Creates a transport-level fetch error.
    #[must_use]
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
            status_code: None,
            timed_out: false,
        }
    }

    /// Creates an error for a non-success HTTP status.
    #[must_use]
    pub fn status(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            reason: format!("HTTP status {status_code}"),
            status_code: Some(status_code),
            timed_out: false,
        }
    }

    /// Creates an error for a request that exceeded its timeout.
    #[must_use]
    pub fn timeout(url: impl Into<String>, timeout_seconds: f64) -> Self {
        Self {
            url: url.into(),
            reason: format!("timed out after {timeout_seconds}s"),
            status_code: None,
            timed_out: true,
        }
    }

    /// Creates an error for a body larger than the configured limit.
    #[must_use]
    pub fn too_large(url: impl Into<String>, size: usize, limit: usize) -> Self {
        Self {
            url: url.into(),
            reason: format!("response of {size} bytes exceeds limit of {limit} bytes"),
            status_code: None,
            timed_out: false,
        }
    }
}

/// Error raised when a link's anchor text is absent from every sentence of
/// its paragraph.
#[derive(Debug, Clone, Error)]
#[error("Anchor text '{anchor_text}' was not found in any of {} sentences", .sentences.len())]
pub struct NoMatchError {
    /// The anchor text that was searched for.
    pub anchor_text: String,
    /// The sentences the paragraph was split into.
    pub sentences: Vec<String>,
}

impl NoMatchError {
    /// Creates a new no-match error.
    #[must_use]
    pub fn new(anchor_text: impl Into<String>, sentences: Vec<String>) -> Self {
        Self {
            anchor_text: anchor_text.into(),
            sentences,
        }
    }
}

/// Error raised when the frontier is exhausted without reaching the target.
#[derive(Debug, Clone, Error)]
#[error("No route from {from} to {to} within {max_depth} hops ({pages_expanded} pages expanded)")]
pub struct RouteNotFoundError {
    /// The start address.
    pub from: String,
    /// The target address.
    pub to: String,
    /// The depth bound the search ran with.
    pub max_depth: usize,
    /// Number of pages expanded before giving up.
    pub pages_expanded: usize,
}

impl RouteNotFoundError {
    /// Creates a new route-not-found error.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        max_depth: usize,
        pages_expanded: usize,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            max_depth,
            pages_expanded,
        }
    }
}

/// Which hardening limit stopped a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchLimit {
    /// Total number of page expansions.
    Expansions(usize),
    /// Wall-clock budget in seconds.
    TimeLimit(f64),
}

impl std::fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expansions(max) => write!(f, "expansion limit of {max} pages"),
            Self::TimeLimit(seconds) => write!(f, "time limit of {seconds}s"),
        }
    }
}

/// Error raised when a search is stopped by one of its limits.
#[derive(Debug, Clone, Error)]
#[error("Search stopped by {limit} after expanding {pages_expanded} pages")]
pub struct SearchLimitError {
    /// The limit that was reached.
    pub limit: SearchLimit,
    /// Number of pages expanded before stopping.
    pub pages_expanded: usize,
}

impl SearchLimitError {
    /// Creates a new search limit error.
    #[must_use]
    pub fn new(limit: SearchLimit, pages_expanded: usize) -> Self {
        Self {
            limit,
            pages_expanded,
        }
    }
}

/// Error raised when an address cannot be parsed.
#[derive(Debug, Clone, Error)]
#[error("Invalid address '{input}': {reason}")]
pub struct InvalidAddressError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidAddressError {
    /// Creates a new invalid address error.
    #[must_use]
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_constructors() {
        let err = FetchError::status("https://example.org/wiki/A", 404);
        assert_eq!(err.status_code, Some(404));
        assert!(!err.timed_out);
        assert_eq!(err.to_string(), "Failed to fetch https://example.org/wiki/A: HTTP status 404");

        let err = FetchError::timeout("https://example.org/wiki/A", 30.0);
        assert!(err.timed_out);
        assert!(err.to_string().contains("timed out after 30s"));
    }

    #[test]
    fn test_no_match_error_message() {
        let err = NoMatchError::new("Rust", vec!["One.".to_string(), "Two.".to_string()]);
        assert_eq!(err.to_string(), "Anchor text 'Rust' was not found in any of 2 sentences");
    }

    #[test]
    fn test_route_not_found_is_distinguishable() {
        let err: RouteError = RouteNotFoundError::new("https://a.org/wiki/A", "https://a.org/wiki/C", 1, 2).into();
        assert!(err.is_route_not_found());
        assert_eq!(err.kind(), "RouteNotFound");

        let other: RouteError = SearchLimitError::new(SearchLimit::Expansions(10), 10).into();
        assert!(!other.is_route_not_found());
    }

    #[test]
    fn test_route_error_to_dict() {
        let err: RouteError = RouteNotFoundError::new("https://a.org/wiki/A", "https://a.org/wiki/C", 3, 7).into();
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "RouteNotFound");
        assert_eq!(dict.get("max_depth"), Some(&serde_json::json!(3)));
        assert_eq!(dict.get("pages_expanded"), Some(&serde_json::json!(7)));
        assert!(dict.contains_key("message"));
    }

    #[test]
    fn test_search_limit_display() {
        let err = SearchLimitError::new(SearchLimit::TimeLimit(2.5), 4);
        assert_eq!(err.to_string(), "Search stopped by time limit of 2.5s after expanding 4 pages");
    }
}
