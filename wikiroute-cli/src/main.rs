//! Command-line front end: prompts for two pages and prints the route
//! between them.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Input};

use wikiroute::prelude::*;

/// Page budget used when neither the flag nor the config file sets one.
const DEFAULT_MAX_PAGES: usize = 500;

/// Find a route of links between two encyclopedia pages.
#[derive(Parser, Debug)]
#[command(name = "wikiroute")]
#[command(version)]
#[command(about = "Find a route of hyperlinks between two encyclopedia pages")]
struct Cli {
    /// Page to start from; prompted for when omitted
    #[arg(long)]
    from: Option<String>,

    /// Page to reach; prompted for when omitted
    #[arg(long)]
    to: Option<String>,

    /// Maximum number of hops
    #[arg(long)]
    max_depth: Option<usize>,

    /// Only follow links whose href starts with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Stop after expanding this many pages [default: 500]
    #[arg(long)]
    max_pages: Option<usize>,

    /// Stop after this many seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Search breadth-first for the shortest route
    #[arg(long)]
    breadth_first: bool,

    /// Print the route as JSON
    #[arg(long)]
    json: bool,

    /// Append-only log file
    #[arg(long, default_value = "logs.txt")]
    log_file: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn finder_config(&self) -> Result<RouteFinderConfig> {
        let mut config = match &self.config {
            Some(path) => RouteFinderConfig::from_json_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => RouteFinderConfig::default(),
        };

        if let Some(max_depth) = self.max_depth {
            config.search.max_depth = max_depth;
        }
        if let Some(prefix) = &self.prefix {
            config.expansion.link_prefix.clone_from(prefix);
        }
        if let Some(timeout) = self.timeout {
            config.fetch.timeout_seconds = timeout;
        }
        if self.time_limit.is_some() {
            config.search.time_limit_seconds = self.time_limit;
        }
        config.search.max_expansions = self
            .max_pages
            .or(config.search.max_expansions)
            .or(Some(DEFAULT_MAX_PAGES));
        if self.breadth_first {
            config.search.frontier_order = FrontierOrder::BreadthFirst;
        }

        config.validate()?;
        Ok(config)
    }
}

fn prompt(label: &str, given: Option<&str>) -> Result<String> {
    if let Some(value) = given {
        return Ok(value.to_string());
    }
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .interact_text()
        .with_context(|| format!("failed to read {label}"))?;
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&LogConfig::new().with_file(&cli.log_file))
        .with_context(|| format!("failed to open log file {}", cli.log_file.display()))?;

    let config = cli.finder_config()?;
    let from = prompt("Start page URL", cli.from.as_deref())?;
    let to = prompt("Target page URL", cli.to.as_deref())?;
    let start = Address::parse(&from)?;
    let target = Address::parse(&to)?;

    let finder = RouteFinder::from_config(&config)?;

    let token = Arc::new(CancellationToken::new());
    {
        let token = Arc::clone(&token);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel("interrupted");
            }
        });
    }

    tracing::info!(from = %start, to = %target, "Searching");
    match finder.search(&start, &target, &token).await {
        Ok(route) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&route)?);
            } else {
                println!("{route}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(RouteError::RouteNotFound(err)) => {
            eprintln!(
                "No route from {} to {} within {} hops.",
                err.from, err.to, err.max_depth
            );
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "wikiroute",
            "--from",
            "https://en.wikipedia.org/wiki/A",
            "--max-depth",
            "5",
            "--prefix",
            "/articles/",
            "--timeout",
            "10",
            "--breadth-first",
        ]);
        let config = cli.finder_config().unwrap();

        assert_eq!(cli.from.as_deref(), Some("https://en.wikipedia.org/wiki/A"));
        assert_eq!(config.search.max_depth, 5);
        assert_eq!(config.expansion.link_prefix, "/articles/");
        assert_eq!(config.fetch.timeout_seconds, 10.0);
        assert_eq!(config.search.max_expansions, Some(500));
        assert_eq!(config.search.frontier_order, FrontierOrder::BreadthFirst);
        assert_eq!(cli.log_file, PathBuf::from("logs.txt"));
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::parse_from(["wikiroute"]);
        let config = cli.finder_config().unwrap();

        assert!(cli.from.is_none());
        assert_eq!(config.search.max_depth, 3);
        assert_eq!(config.expansion.link_prefix, "/wiki/");
        assert_eq!(config.search.frontier_order, FrontierOrder::DepthFirst);
        assert_eq!(config.search.max_expansions, Some(DEFAULT_MAX_PAGES));
    }

    fn write_config(json: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wikiroute.json"), json).unwrap();
        dir
    }

    #[test]
    fn test_max_pages_flag_beats_config_file() {
        let dir = write_config(r#"{"search": {"max_expansions": 1000}}"#);
        let path = dir.path().join("wikiroute.json");
        let cli = Cli::parse_from(["wikiroute", "--config", path.to_str().unwrap(), "--max-pages", "10"]);

        let config = cli.finder_config().unwrap();
        assert_eq!(config.search.max_expansions, Some(10));
    }

    #[test]
    fn test_config_file_page_budget_kept_without_flag() {
        let dir = write_config(r#"{"search": {"max_expansions": 1000, "max_depth": 4}}"#);
        let path = dir.path().join("wikiroute.json");
        let cli = Cli::parse_from(["wikiroute", "--config", path.to_str().unwrap()]);

        let config = cli.finder_config().unwrap();
        assert_eq!(config.search.max_expansions, Some(1000));
        assert_eq!(config.search.max_depth, 4);
    }

    #[test]
    fn test_oversized_timeout_flag_is_rejected() {
        let cli = Cli::parse_from(["wikiroute", "--timeout", "1e20"]);
        assert!(cli.finder_config().is_err());
    }

    #[test]
    fn test_invalid_flag_values_are_rejected() {
        let cli = Cli::parse_from(["wikiroute", "--prefix", "wiki/"]);
        assert!(cli.finder_config().is_err());
    }

    #[test]
    fn test_given_values_skip_prompt() {
        assert_eq!(prompt("Start page URL", Some("https://x.org/wiki/A")).unwrap(), "https://x.org/wiki/A");
    }
}
