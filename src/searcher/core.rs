//! Searcher struct, shared state and observer plumbing

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::SearcherConfig;
use crate::facet_stats::FacetStat;
use crate::observer::{ObserverNotification, ObserverSet, ResultObserver};
use crate::pagination::{PaginationController, PaginationState};
use crate::query::QueryState;
use crate::refinement::RefinementStore;
use crate::search_events::{EventBusError, SearchEvent, SearchEventBus, ShutdownReason};
use crate::sequencer::{RequestSequencer, SequenceNumber, SequenceSource};
use crate::transport::SearchTransport;

/// Everything guarded by the session lock
#[derive(Debug)]
pub(super) struct SearcherState {
    pub(super) query: QueryState,
    pub(super) refinements: RefinementStore,
    pub(super) sequencer: RequestSequencer,
    pub(super) pagination: PaginationController,
    pub(super) facet_stats: IndexMap<String, FacetStat>,
}

pub(super) struct SearcherInner {
    pub(super) id: u64,
    pub(super) config: SearcherConfig,
    pub(super) transport: Arc<dyn SearchTransport>,
    pub(super) events: SearchEventBus,
    pub(super) runtime: Handle,
    pub(super) state: Mutex<SearcherState>,
    pub(super) observers: Arc<RwLock<ObserverSet>>,
    pub(super) notifier: mpsc::UnboundedSender<ObserverNotification>,
}

impl SearcherInner {
    /// Fire-and-forget publication honouring the bus backpressure mode
    pub(super) fn publish(&self, event: SearchEvent) {
        match self.events.publish_with_backpressure(event) {
            Ok(_) => {}
            Err(EventBusError::ChannelFull) => {
                debug!(searcher_id = self.id, "event bus full, search event dropped");
            }
            Err(e) => trace!(searcher_id = self.id, "search event not delivered: {e}"),
        }
    }

    /// Queue a callback; must be called with the state lock held to keep order
    pub(super) fn notify(&self, notification: ObserverNotification) {
        if self.notifier.send(notification).is_err() {
            debug!(searcher_id = self.id, "observer dispatcher stopped, notification dropped");
        }
    }
}

impl Drop for SearcherInner {
    fn drop(&mut self) {
        let cancelled = self.state.get_mut().sequencer.cancel_all();
        if !cancelled.is_empty() {
            debug!(searcher_id = self.id, count = cancelled.len(), "pending requests cancelled on drop");
        }
    }
}

/// Handle to one search session
///
/// Cheap to clone; clones drive the same session.
#[derive(Clone)]
pub struct Searcher {
    pub(super) inner: Arc<SearcherInner>,
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Searcher {
    pub(super) fn start(
        id: u64,
        config: SearcherConfig,
        transport: Arc<dyn SearchTransport>,
        sequences: SequenceSource,
        events: SearchEventBus,
        runtime: Handle,
    ) -> Self {
        let query = QueryState::default().with_hits_per_page(config.hits_per_page);
        let observers = Arc::new(RwLock::new(ObserverSet::new()));
        let (notifier, receiver) = mpsc::unbounded_channel();

        runtime.spawn(run_dispatcher(id, receiver, Arc::clone(&observers)));

        let state = SearcherState {
            query,
            refinements: RefinementStore::new(),
            sequencer: RequestSequencer::new(sequences),
            pagination: PaginationController::new(),
            facet_stats: IndexMap::new(),
        };

        debug!(searcher_id = id, "searcher started");
        Self {
            inner: Arc::new(SearcherInner {
                id,
                config,
                transport,
                events,
                runtime,
                state: Mutex::new(state),
                observers,
                notifier,
            }),
        }
    }

    /// Identifier assigned at construction (0-based within a registry)
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    #[must_use]
    pub fn config(&self) -> &SearcherConfig {
        &self.inner.config
    }

    /// Snapshot of the current query, derived filters included
    #[must_use]
    pub fn query(&self) -> QueryState {
        self.inner.state.lock().query.clone()
    }

    #[must_use]
    pub fn pagination(&self) -> PaginationState {
        self.inner.state.lock().pagination.snapshot()
    }

    /// True unless the end was reached or a requested page is not displayed yet
    #[must_use]
    pub fn should_load_more(&self) -> bool {
        self.inner.state.lock().pagination.should_load_more()
    }

    #[must_use]
    pub fn has_pending_requests(&self) -> bool {
        self.inner.state.lock().sequencer.has_pending()
    }

    #[must_use]
    pub fn pending_request_count(&self) -> usize {
        self.inner.state.lock().sequencer.pending_count()
    }

    #[must_use]
    pub fn last_displayed_sequence(&self) -> SequenceNumber {
        self.inner.state.lock().sequencer.last_displayed()
    }

    /// Statistic of `attribute` from the latest result that carried one
    #[must_use]
    pub fn facet_stat(&self, attribute: &str) -> Option<FacetStat> {
        self.inner.state.lock().facet_stats.get(attribute).copied()
    }

    #[must_use]
    pub fn facet_stats(&self) -> IndexMap<String, FacetStat> {
        self.inner.state.lock().facet_stats.clone()
    }

    /// Bus this searcher publishes its lifecycle events on
    #[must_use]
    pub fn events(&self) -> &SearchEventBus {
        &self.inner.events
    }

    /// Add an observer; registering the same `Arc` twice is a no-op
    pub fn register_observer(&self, observer: Arc<dyn ResultObserver>) -> &Self {
        if !self.inner.observers.write().register(observer) {
            trace!(searcher_id = self.inner.id, "observer already registered");
        }
        self
    }

    /// Returns `false` if the observer was not registered
    pub fn unregister_observer(&self, observer: &Arc<dyn ResultObserver>) -> bool {
        self.inner.observers.write().unregister(observer)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.read().len()
    }

    /// Cancel every pending request and shut the event bus down gracefully
    ///
    /// The bus may be shared with other searchers; they lose their event
    /// stream too.
    pub async fn shutdown(&self) {
        self.cancel_pending_requests();
        self.inner
            .events
            .shutdown_gracefully(ShutdownReason::SearcherClosed)
            .await;
        debug!(searcher_id = self.inner.id, "searcher shut down");
    }
}

/// Deliver queued notifications until every sender is gone
async fn run_dispatcher(
    searcher_id: u64,
    mut receiver: mpsc::UnboundedReceiver<ObserverNotification>,
    observers: Arc<RwLock<ObserverSet>>,
) {
    while let Some(notification) = receiver.recv().await {
        let snapshot = observers.read().snapshot();
        notification.deliver(&snapshot);
    }
    trace!(searcher_id, "observer dispatcher terminated");
}
