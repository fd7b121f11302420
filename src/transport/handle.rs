//! Reusable `RequestHandle` implementation

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

use super::RequestHandle;

/// Finished/cancelled flags of one request plus a wake-up for the task running it
///
/// Transports race their work against `cancelled()` and call `finish()` before
/// resolving the completion.
#[derive(Debug, Default)]
pub struct RequestState {
    finished: AtomicBool,
    cancelled: AtomicBool,
    cancel_notify: Notify,
}

impl RequestState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the request finished; returns `false` if it was cancelled first
    pub fn finish(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return false;
        }
        self.finished.store(true, Ordering::SeqCst);
        true
    }

    /// Cancel unless already finished; idempotent
    pub fn cancel(&self) {
        if self.finished.load(Ordering::SeqCst) {
            return;
        }
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            // notify_one keeps a permit if the task is not waiting yet
            self.cancel_notify.notify_one();
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the request is cancelled
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.cancel_notify.notified().await;
    }
}

impl RequestHandle for RequestState {
    fn cancel(&self) {
        RequestState::cancel(self);
    }

    fn is_finished(&self) -> bool {
        RequestState::is_finished(self)
    }

    fn is_cancelled(&self) -> bool {
        RequestState::is_cancelled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_cancel_after_finish_is_ignored() {
        let state = RequestState::new();
        assert!(state.finish());
        state.cancel();
        assert!(state.is_finished());
        assert!(!state.is_cancelled());
    }

    #[test]
    fn test_finish_after_cancel_is_refused() {
        let state = RequestState::new();
        state.cancel();
        state.cancel();
        assert!(state.is_cancelled());
        assert!(!state.finish());
        assert!(!state.is_finished());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiting_task() {
        let state = Arc::new(RequestState::new());
        let waiter = Arc::clone(&state);
        let task = tokio::spawn(async move { waiter.cancelled().await });

        state.cancel();
        tokio::time::timeout(Duration::from_millis(500), task)
            .await
            .expect("cancelled() should resolve after cancel()")
            .expect("waiter task panicked");
    }

    #[tokio::test]
    async fn test_cancel_before_wait_is_not_lost() {
        let state = RequestState::new();
        state.cancel();
        tokio::time::timeout(Duration::from_millis(100), state.cancelled())
            .await
            .expect("cancelled() should resolve immediately");
    }
}
