//! Shutdown operations for the SearchEventBus

use std::sync::atomic::Ordering;

use crate::search_events::types::{SearchEvent, ShutdownReason};

use super::core::SearchEventBus;

impl SearchEventBus {
    /// Signal shutdown to all waiters; idempotent and shared by all clones
    ///
    /// Later `publish` calls are refused with `EventBusError::Shutdown`.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
        log::debug!("Event bus shutdown signaled");
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown has been signaled, immediately if it already was
    pub async fn wait_for_shutdown(&self) {
        let notified = self.shutdown.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_shutdown() {
            return;
        }
        notified.await;
    }

    /// Announce shutdown on the stream, let subscribers drain, then signal waiters
    ///
    /// The `Shutdown` event is the last one subscribers ever see.
    ///
    /// Subscribers get `config().drain_timeout` to process buffered events
    /// after the `Shutdown` event is published.
    pub async fn shutdown_gracefully(&self, reason: ShutdownReason) {
        log::info!("Beginning graceful shutdown of event bus: {reason:?}");
        self.shutdown_flag.store(true, Ordering::SeqCst);

        if self.send(SearchEvent::shutdown(reason)).is_ok() {
            log::debug!("Waiting for subscribers to process events");
            tokio::time::sleep(self.config.drain_timeout).await;
        }

        self.shutdown.notify_waiters();
        log::info!("Event bus graceful shutdown complete");
    }
}
