//! Notification sink for search lifecycle events
//!
//! Every searcher publishes what happens to its requests (started, cancelled,
//! succeeded, failed) on a broadcast bus. Publishing never blocks and never
//! fails a search: an event nobody listens to is counted and dropped.

pub mod bus;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod streaming;
pub mod types;

pub use bus::SearchEventBus;
pub use config::{BackpressureMode, EventBusConfig};
pub use errors::EventBusError;
pub use metrics::{EventBusMetrics, MetricsSnapshot};
pub use streaming::FilteredReceiver;
pub use types::{SearchEvent, ShutdownReason};
