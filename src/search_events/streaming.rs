//! Receivers that only see a subset of search events

use tokio::sync::broadcast::{self, error::TryRecvError};

use super::errors::EventBusError;
use super::types::SearchEvent;

/// Skips every event its predicate rejects
///
/// Skipped events are consumed; lag and closure are reported as they happen.
pub struct FilteredReceiver<F>
where
    F: Fn(&SearchEvent) -> bool + Send + Sync + 'static,
{
    receiver: broadcast::Receiver<SearchEvent>,
    filter: F,
}

impl<F> FilteredReceiver<F>
where
    F: Fn(&SearchEvent) -> bool + Send + Sync + 'static,
{
    pub fn new(receiver: broadcast::Receiver<SearchEvent>, filter: F) -> Self {
        Self { receiver, filter }
    }

    /// Wait for the next accepted event
    ///
    /// # Errors
    /// `Shutdown` once every sender is gone, `ReceiverLagged` if events were
    /// overwritten before this receiver read them.
    pub async fn recv(&mut self) -> Result<SearchEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await?;
            if (self.filter)(&event) {
                return Ok(event);
            }
        }
    }

    /// Next accepted event already buffered, if any
    pub fn try_recv(&mut self) -> Result<Option<SearchEvent>, EventBusError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(EventBusError::Shutdown),
                Err(TryRecvError::Lagged(skipped)) => return Err(EventBusError::ReceiverLagged(skipped)),
            };
            if (self.filter)(&event) {
                return Ok(Some(event));
            }
        }
    }
}
