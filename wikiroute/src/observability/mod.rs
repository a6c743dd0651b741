//! Logging setup and search observers.

mod logging;
mod observer;

pub use logging::{init_logging, LogConfig};
pub use observer::{LoggingSearchObserver, NoOpSearchObserver, PruneReason, SearchObserver};
