//! Publishing operations for the SearchEventBus

use crate::search_events::config::BackpressureMode;
use crate::search_events::errors::EventBusError;
use crate::search_events::types::SearchEvent;

use super::core::SearchEventBus;

impl SearchEventBus {
    /// Publish an event to all current subscribers
    ///
    /// Never blocks. With no subscriber the event is counted as dropped.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of subscribers that will see the event
    /// * `Err(EventBusError::NoSubscribers)` - Nobody is listening
    /// * `Err(EventBusError::Shutdown)` - The bus was shut down; nothing follows `Shutdown`
    pub fn publish(&self, event: SearchEvent) -> Result<usize, EventBusError> {
        if self.is_shutdown() {
            log::trace!("Event refused: bus is shut down");
            return Err(EventBusError::Shutdown);
        }
        self.send(event)
    }

    /// Send without the shutdown check; used for the final `Shutdown` event
    pub(super) fn send(&self, event: SearchEvent) -> Result<usize, EventBusError> {
        match self.sender.send(event) {
            Ok(subscriber_count) => {
                if self.config.enable_metrics {
                    self.metrics.record_published(subscriber_count);
                }
                Ok(subscriber_count)
            }
            Err(_) => {
                if self.config.enable_metrics {
                    self.metrics.record_dropped();
                }
                log::trace!("Event dropped: no active subscribers");
                Err(EventBusError::NoSubscribers)
            }
        }
    }

    /// Publish honouring the configured `BackpressureMode`
    ///
    /// `DropOldest` behaves like `publish()`. `Reject` refuses the event with
    /// `ChannelFull` while the buffer is at capacity.
    pub fn publish_with_backpressure(&self, event: SearchEvent) -> Result<usize, EventBusError> {
        match self.config.backpressure_mode {
            BackpressureMode::DropOldest => self.publish(event),
            BackpressureMode::Reject => {
                let _guard = self.send_lock.lock();
                if self.sender.len() >= self.config.capacity {
                    if self.config.enable_metrics {
                        self.metrics.record_rejected();
                    }
                    log::warn!(
                        "Event rejected: channel full ({} buffered)",
                        self.sender.len()
                    );
                    return Err(EventBusError::ChannelFull);
                }
                self.publish(event)
            }
        }
    }
}
