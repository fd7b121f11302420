//! Request dispatch and completion handling

use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use super::core::{Searcher, SearcherInner, SearcherState};
use crate::errors::{SearcherError, SearcherResult, TransportError};
use crate::facet_stats::compute_facet_stats;
use crate::observer::ObserverNotification;
use crate::query::QueryState;
use crate::refinement::RefinementStore;
use crate::results::{ResultPayload, SearchResults};
use crate::search_events::SearchEvent;
use crate::sequencer::{Decision, IgnoreReason, RequestKind, SequenceNumber};
use crate::transport::{CompletionSender, RequestHandle, TransportOutcome, completion_channel};

impl Searcher {
    /// Start a search with the current state
    ///
    /// Cancels every pending request, restarts pagination and publishes
    /// `SearchStarted` before returning. The response is handled in the
    /// background.
    pub fn search(&self) -> &Self {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        self.inner.cancel_pending(state);
        state.pagination.begin_search();
        let query = state.query.clone().with_page(0);
        self.inner.dispatch(state, RequestKind::NewSearch, query);
        self
    }

    /// Replace the query text, then `search()`
    pub fn search_query(&self, text: impl Into<String>) -> &Self {
        {
            let mut state = self.inner.state.lock();
            state.query = state.query.clone().with_text(text);
        }
        self.search()
    }

    /// Request the next page of the current search
    ///
    /// No-op unless `should_load_more()` holds.
    pub fn load_more(&self) -> &Self {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        let Some(page) = state.pagination.begin_load_more() else {
            debug!(searcher_id = self.inner.id, "load_more skipped");
            return self;
        };
        let query = state.query.clone().with_page(page);
        self.inner.dispatch(state, RequestKind::LoadMore, query);
        self
    }

    /// Cancel every request not already finished or cancelled; idempotent
    pub fn cancel_pending_requests(&self) -> &Self {
        let mut state = self.inner.state.lock();
        self.inner.cancel_pending(&mut state);
        self
    }

    /// Back to an empty session
    ///
    /// Cancels pending requests and clears pagination and every refinement.
    /// The query text and requested facets are kept. The last displayed
    /// sequence number is kept too, so no response issued before the reset
    /// can ever be displayed.
    pub fn reset(&self) -> &Self {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        self.inner.cancel_pending(state);
        state.pagination.reset();
        state.refinements.clear_all();
        state.query = state.refinements.apply_to(&state.query);
        debug!(searcher_id = self.inner.id, "searcher reset");
        self
    }

    /// Refresh facet statistics without notifying observers
    ///
    /// The request is not sequenced: it neither cancels nor can be cancelled
    /// by searches, and its failure is only logged.
    pub fn refresh_facet_stats(&self) -> &Self {
        let (completion, receiver) = completion_channel();
        {
            let state = self.inner.state.lock();
            let query = state.query.clone().with_page(0);
            self.inner
                .start_request(&state.refinements, &query, completion);
        }

        let weak = Arc::downgrade(&self.inner);
        let searcher_id = self.inner.id;
        self.inner.runtime.spawn(async move {
            match receiver.await {
                Ok(Ok(payload)) => {
                    if let Some(inner) = weak.upgrade() {
                        let mut state = inner.state.lock();
                        state.facet_stats.extend(compute_facet_stats(&payload));
                    }
                }
                Ok(Err(e)) => warn!(searcher_id, "facet stats refresh failed: {e}"),
                Err(_) => debug!(searcher_id, "facet stats refresh dropped"),
            }
        });
        self
    }
}

impl SearcherInner {
    pub(super) fn cancel_pending(&self, state: &mut SearcherState) {
        for sequence in state.sequencer.cancel_all() {
            debug!(searcher_id = self.id, sequence = sequence.get(), "request cancelled");
            self.publish(SearchEvent::search_cancelled(sequence));
        }
    }

    /// Hand `query` to the transport, picking the disjunctive variant when needed
    fn start_request(
        &self,
        refinements: &RefinementStore,
        query: &QueryState,
        completion: CompletionSender,
    ) -> Arc<dyn RequestHandle> {
        let disjunctive = refinements.disjunctive_facets();
        if disjunctive.is_empty() {
            self.transport.execute_search(query, completion)
        } else {
            self.transport.execute_disjunctive_search(
                query,
                disjunctive,
                refinements.refinement_map(),
                completion,
            )
        }
    }

    /// Sequence and start a request, then wait for its completion in the background
    fn dispatch(
        self: &Arc<Self>,
        state: &mut SearcherState,
        kind: RequestKind,
        query: QueryState,
    ) -> SequenceNumber {
        let (completion, receiver) = completion_channel();
        let refinements = &state.refinements;
        let sequence = state.sequencer.dispatch(kind, |sequence| {
            self.publish(SearchEvent::search_started(sequence, kind, query.clone()));
            self.start_request(refinements, &query, completion)
        });
        debug!(
            searcher_id = self.id,
            sequence = sequence.get(),
            %kind,
            page = query.page(),
            "search started"
        );

        let weak = Arc::downgrade(self);
        self.runtime
            .spawn(await_completion(weak, sequence, kind, query, receiver));
        sequence
    }

    /// Apply one completion under the state lock
    ///
    /// Stale and cancelled responses are dropped silently. A primary search
    /// accepted by nobody yet superseded is reported as
    /// `ProtocolInvariantViolation`.
    pub(super) fn complete(
        &self,
        sequence: SequenceNumber,
        kind: RequestKind,
        query: QueryState,
        outcome: Result<TransportOutcome, oneshot::error::RecvError>,
    ) -> SearcherResult<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(_) if !state.sequencer.is_pending(sequence) => {
                debug!(searcher_id = self.id, sequence = sequence.get(), "cancelled request released");
                return Ok(());
            }
            Err(_) => Err(TransportError::Dropped),
        };

        let completion = state.sequencer.complete(sequence);
        for cancelled in &completion.cancelled {
            debug!(
                searcher_id = self.id,
                sequence = cancelled.get(),
                superseded_by = sequence.get(),
                "request cancelled"
            );
            self.publish(SearchEvent::search_cancelled(*cancelled));
        }

        match completion.decision {
            Decision::Accept => {}
            Decision::Ignore(IgnoreReason::Cancelled) => {
                debug!(searcher_id = self.id, sequence = sequence.get(), %kind, "response of cancelled request dropped");
                return Ok(());
            }
            Decision::Ignore(IgnoreReason::Superseded) if kind == RequestKind::LoadMore => {
                debug!(searcher_id = self.id, sequence = sequence.get(), "stale load-more response dropped");
                return Ok(());
            }
            Decision::Ignore(IgnoreReason::Superseded) => {
                let last_displayed = state.sequencer.last_displayed();
                error!(
                    searcher_id = self.id,
                    sequence = sequence.get(),
                    last_displayed = last_displayed.get(),
                    "search completed after a newer result was displayed"
                );
                debug_assert!(
                    sequence > last_displayed,
                    "search {sequence} should have been cancelled before {last_displayed} was displayed"
                );
                return Err(SearcherError::ProtocolInvariantViolation {
                    sequence,
                    last_displayed,
                });
            }
        }

        match outcome {
            Ok(payload) => self.accept_results(state, sequence, kind, query, payload),
            Err(error) => {
                warn!(searcher_id = self.id, sequence = sequence.get(), %kind, "search failed: {error}");
                match kind {
                    RequestKind::NewSearch => state.pagination.search_failed(),
                    RequestKind::LoadMore => state.pagination.load_more_failed(),
                }
                self.publish(SearchEvent::search_failed(sequence, kind, error.clone()));
                self.notify(ObserverNotification::Error { query, error });
            }
        }
        Ok(())
    }

    fn accept_results(
        &self,
        state: &mut SearcherState,
        sequence: SequenceNumber,
        kind: RequestKind,
        query: QueryState,
        payload: ResultPayload,
    ) {
        let payload = Arc::new(payload);
        self.publish(SearchEvent::search_succeeded(sequence, kind, Arc::clone(&payload)));

        let is_loading_more = match kind {
            RequestKind::NewSearch => {
                state.pagination.first_page_displayed(&payload);
                false
            }
            RequestKind::LoadMore => {
                if !state.pagination.next_page_received(&payload) {
                    debug!(searcher_id = self.id, sequence = sequence.get(), "empty page, end reached");
                    return;
                }
                true
            }
        };

        state.facet_stats.extend(compute_facet_stats(&payload));
        debug!(
            searcher_id = self.id,
            sequence = sequence.get(),
            page = payload.page,
            hits = payload.hits.len(),
            end_reached = state.pagination.end_reached(),
            "results accepted"
        );
        self.notify(ObserverNotification::Results {
            results: SearchResults {
                sequence,
                query,
                payload,
            },
            is_loading_more,
        });
    }
}

async fn await_completion(
    searcher: Weak<SearcherInner>,
    sequence: SequenceNumber,
    kind: RequestKind,
    query: QueryState,
    receiver: oneshot::Receiver<TransportOutcome>,
) {
    let outcome = receiver.await;
    let Some(inner) = searcher.upgrade() else {
        return;
    };
    if let Err(e) = inner.complete(sequence, kind, query, outcome) {
        debug!(searcher_id = inner.id, fatal = e.is_fatal(), "completion rejected: {e}");
    }
}
