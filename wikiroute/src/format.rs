//! Plain-text rendering of routes.

use crate::address::Address;
use crate::route::{Route, SentenceIndex};

/// Renders a route as numbered blocks of hop number, sentence and URL.
///
/// ```text
/// #1
/// See B for details.
/// https://en.wikipedia.org/wiki/B
///
/// #2
/// C is related to B.
/// https://en.wikipedia.org/wiki/C
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteFormatter {
    missing_sentence: String,
}

impl RouteFormatter {
    /// Creates a formatter that prints an empty line for missing sentences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text printed when a hop has no recorded sentence.
    #[must_use]
    pub fn with_missing_sentence(mut self, placeholder: impl Into<String>) -> Self {
        self.missing_sentence = placeholder.into();
        self
    }

    /// Formats an assembled route.
    #[must_use]
    pub fn format(&self, route: &Route) -> String {
        self.render(
            route
                .hops
                .iter()
                .map(|hop| (hop.position, hop.sentence.as_deref(), &hop.address)),
        )
    }

    /// Formats a raw path against a sentence index.
    #[must_use]
    pub fn format_path(&self, path: &[Address], index: &SentenceIndex) -> String {
        self.render(
            path.iter()
                .enumerate()
                .map(|(i, address)| (i + 1, index.get(address), address)),
        )
    }

    fn render<'a>(&self, hops: impl Iterator<Item = (usize, Option<&'a str>, &'a Address)>) -> String {
        hops.map(|(position, sentence, address)| {
            let sentence = sentence.unwrap_or(&self.missing_sentence);
            format!("#{position}\n{sentence}\n{address}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}

/// Formats a route with the default formatter.
#[must_use]
pub fn format_route(route: &Route) -> String {
    RouteFormatter::new().format(route)
}
