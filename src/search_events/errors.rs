//! Error types for event bus operations

use tokio::sync::broadcast::error::RecvError;

/// Error types for event bus operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    /// No active subscribers when publishing
    #[error("No active subscribers")]
    NoSubscribers,

    /// Receiver couldn't keep up, missed messages
    #[error("Receiver lagged behind, missed {0} messages")]
    ReceiverLagged(u64),

    /// The bus was shut down, or every sender is gone
    #[error("Event bus shutdown")]
    Shutdown,

    /// Channel is at capacity and backpressure mode is `Reject`
    #[error("Event channel is full (capacity exceeded)")]
    ChannelFull,
}

impl From<RecvError> for EventBusError {
    fn from(error: RecvError) -> Self {
        match error {
            RecvError::Closed => EventBusError::Shutdown,
            RecvError::Lagged(skipped) => EventBusError::ReceiverLagged(skipped),
        }
    }
}
