//! Configuration types for fetching, expansion and searching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::RouteError;

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_size")]
    pub max_response_size: usize,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> f64 {
    30.0
}

fn default_user_agent() -> String {
    format!("wikiroute/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            max_response_size: default_max_size(),
            headers: HashMap::new(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets timeout as Duration.
    pub fn timeout(&self) -> Result<Duration, RouteError> {
        seconds_to_duration("fetch.timeout_seconds", self.timeout_seconds)
    }
}

/// Configuration for turning a page into in-scope links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpansionConfig {
    /// Href prefix a link must start with to be followed.
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,
    /// Tag name of the body paragraphs links must sit directly inside.
    #[serde(default = "default_paragraph_tag")]
    pub paragraph_tag: String,
    /// Whether `#fragment` parts are dropped from discovered addresses.
    #[serde(default = "default_true")]
    pub strip_fragments: bool,
}

fn default_link_prefix() -> String {
    "/wiki/".to_string()
}

fn default_paragraph_tag() -> String {
    "p".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            link_prefix: default_link_prefix(),
            paragraph_tag: default_paragraph_tag(),
            strip_fragments: true,
        }
    }
}

impl ExpansionConfig {
    /// Creates a new expansion configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the in-scope href prefix.
    #[must_use]
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }

    /// Sets the paragraph tag name.
    #[must_use]
    pub fn with_paragraph_tag(mut self, tag: impl Into<String>) -> Self {
        self.paragraph_tag = tag.into();
        self
    }

    /// Keeps `#fragment` parts on discovered addresses.
    #[must_use]
    pub fn keep_fragments(mut self) -> Self {
        self.strip_fragments = false;
        self
    }
}

/// Order in which frontier entries are explored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontierOrder {
    /// Last discovered link first. No shortest-route guarantee.
    #[default]
    DepthFirst,
    /// First discovered link first. Finds a route with the fewest hops.
    BreadthFirst,
}

/// Configuration for the route search engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of hops before the target.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Exploration order.
    #[serde(default)]
    pub frontier_order: FrontierOrder,
    /// Cap on the number of pages expanded in one search.
    #[serde(default)]
    pub max_expansions: Option<usize>,
    /// Wall-clock budget for one search, in seconds.
    #[serde(default)]
    pub time_limit_seconds: Option<f64>,
}

fn default_max_depth() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            frontier_order: FrontierOrder::default(),
            max_expansions: None,
            time_limit_seconds: None,
        }
    }
}

impl SearchConfig {
    /// Creates a new search configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the exploration order.
    #[must_use]
    pub fn with_frontier_order(mut self, order: FrontierOrder) -> Self {
        self.frontier_order = order;
        self
    }

    /// Caps the number of pages expanded.
    #[must_use]
    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    /// Sets a wall-clock budget.
    #[must_use]
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    /// Gets the time limit as Duration.
    pub fn time_limit(&self) -> Result<Option<Duration>, RouteError> {
        self.time_limit_seconds
            .map(|seconds| seconds_to_duration("search.time_limit_seconds", seconds))
            .transpose()
    }
}

/// Converts a positive number of seconds that fits in a [`Duration`].
fn seconds_to_duration(field: &str, seconds: f64) -> Result<Duration, RouteError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(RouteError::Config(format!(
            "{field} must be a positive number, got {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| RouteError::Config(format!("{field} is out of range ({seconds}): {e}")))
}

/// Combined configuration for a route finder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteFinderConfig {
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Expansion configuration.
    #[serde(default)]
    pub expansion: ExpansionConfig,
    /// Search configuration.
    #[serde(default)]
    pub search: SearchConfig,
}

impl RouteFinderConfig {
    /// Creates a new route finder configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, RouteError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), RouteError> {
        self.fetch.timeout()?;
        if self.fetch.max_response_size == 0 {
            return Err(RouteError::Config("fetch.max_response_size must be greater than zero".to_string()));
        }
        if !self.expansion.link_prefix.starts_with('/') {
            return Err(RouteError::Config(format!(
                "expansion.link_prefix must start with '/', got '{}'",
                self.expansion.link_prefix
            )));
        }
        if self.expansion.paragraph_tag.trim().is_empty() {
            return Err(RouteError::Config("expansion.paragraph_tag must not be empty".to_string()));
        }
        if self.search.max_expansions == Some(0) {
            return Err(RouteError::Config("search.max_expansions must be greater than zero".to_string()));
        }
        self.search.time_limit()?;
        Ok(())
    }
}
