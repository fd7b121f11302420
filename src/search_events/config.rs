//! Configuration types for the event bus

use std::time::Duration;

/// Strategy for handling channel saturation
///
/// Publishing happens while a searcher holds its state lock, so there is no
/// mode that waits for capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackpressureMode {
    /// Overwrite the oldest buffered event; slow receivers see `ReceiverLagged`
    #[default]
    DropOldest,

    /// Refuse the event with `ChannelFull` while the buffer is full
    Reject,
}

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Maximum number of events that can be buffered
    pub capacity: usize,

    /// Backpressure strategy when channel reaches capacity
    pub backpressure_mode: BackpressureMode,

    /// Pressure threshold (0.0-1.0) for `is_overloaded()`
    pub overload_threshold: f64,

    /// Whether to enable event metrics collection
    pub enable_metrics: bool,

    /// How long `shutdown_gracefully` lets subscribers drain
    pub drain_timeout: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            backpressure_mode: BackpressureMode::default(),
            overload_threshold: 0.8,
            enable_metrics: true,
            drain_timeout: Duration::from_millis(500),
        }
    }
}
