//! In-memory collaborators for exercising searches without a network.
//!
//! - [`StaticFetcher`] serves canned HTML and records every request
//! - [`StaticLinkExpander`] skips markup entirely and serves a link graph
//! - [`RecordingObserver`] captures search events for assertions

mod fixtures;
mod mocks;

pub use fixtures::{wiki_link, wiki_page, StaticFetcher};
pub use mocks::{RecordedEvent, RecordingObserver, StaticLinkExpander};
