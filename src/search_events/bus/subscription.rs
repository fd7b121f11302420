//! Subscription operations for the SearchEventBus

use tokio::sync::broadcast;

use crate::search_events::streaming::FilteredReceiver;
use crate::search_events::types::SearchEvent;

use super::core::SearchEventBus;

impl SearchEventBus {
    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        let receiver = self.sender.subscribe();
        if self.config.enable_metrics {
            self.metrics.update_subscriber_count(self.sender.receiver_count());
        }
        receiver
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// Receive only the events `filter` accepts
    pub fn subscribe_filtered<F>(&self, filter: F) -> FilteredReceiver<F>
    where
        F: Fn(&SearchEvent) -> bool + Send + Sync + 'static,
    {
        FilteredReceiver::new(self.subscribe(), filter)
    }
}
