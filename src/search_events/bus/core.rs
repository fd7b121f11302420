//! SearchEventBus struct definition and constructors

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::{Notify, broadcast};

use crate::search_events::config::EventBusConfig;
use crate::search_events::metrics::EventBusMetrics;
use crate::search_events::types::SearchEvent;

/// Event bus for publishing and subscribing to search events
///
/// Clones share the channel, the metrics and the shutdown signal.
#[derive(Debug, Clone)]
pub struct SearchEventBus {
    pub(super) sender: broadcast::Sender<SearchEvent>,
    pub(super) config: Arc<EventBusConfig>,
    pub(super) metrics: EventBusMetrics,
    pub(super) shutdown: Arc<Notify>,
    pub(super) shutdown_flag: Arc<AtomicBool>,
    /// Serializes check-and-send in `BackpressureMode::Reject`
    pub(super) send_lock: Arc<Mutex<()>>,
}

impl Default for SearchEventBus {
    fn default() -> Self {
        Self::with_config(EventBusConfig::default())
    }
}

impl SearchEventBus {
    /// Create a bus buffering up to `capacity` events
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(EventBusConfig {
            capacity,
            ..Default::default()
        })
    }

    #[must_use]
    pub fn with_config(mut config: EventBusConfig) -> Self {
        // broadcast::channel panics on a zero capacity
        config.capacity = config.capacity.max(1);
        let (sender, _) = broadcast::channel(config.capacity);
        Self {
            sender,
            config: Arc::new(config),
            metrics: EventBusMetrics::new(),
            shutdown: Arc::new(Notify::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            send_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Counters of this bus; use `snapshot()` for a coherent read
    #[must_use]
    pub fn metrics(&self) -> &EventBusMetrics {
        &self.metrics
    }

    /// Ratio of buffered events to capacity (0.0 = empty, 1.0 = full)
    #[must_use]
    pub fn pressure(&self) -> f64 {
        self.sender.len() as f64 / self.config.capacity as f64
    }

    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        self.pressure() >= self.config.overload_threshold
    }

    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.sender.len()
    }
}
