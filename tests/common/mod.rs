//! Test utilities shared by the integration tests

use indexmap::IndexMap;
use kodegen_tools_instantsearch::{
    CompletionSender, QueryState, RequestHandle, RequestState, ResultObserver, ResultPayload,
    SearchResults, SearchTransport, SequenceNumber, TransportError,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// One request seen by `MockTransport`
pub struct RecordedRequest {
    pub query: QueryState,
    pub disjunctive: Option<(Vec<String>, IndexMap<String, Vec<String>>)>,
    pub state: Arc<RequestState>,
    completion: Option<CompletionSender>,
}

/// Transport whose requests only complete when a test resolves them
#[derive(Default)]
pub struct MockTransport {
    requests: Mutex<Vec<RecordedRequest>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(
        &self,
        query: &QueryState,
        disjunctive: Option<(Vec<String>, IndexMap<String, Vec<String>>)>,
        completion: CompletionSender,
    ) -> Arc<dyn RequestHandle> {
        let state = Arc::new(RequestState::new());
        self.requests.lock().push(RecordedRequest {
            query: query.clone(),
            disjunctive,
            state: Arc::clone(&state),
            completion: Some(completion),
        });
        state
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn query(&self, index: usize) -> QueryState {
        self.requests.lock()[index].query.clone()
    }

    pub fn state(&self, index: usize) -> Arc<RequestState> {
        Arc::clone(&self.requests.lock()[index].state)
    }

    pub fn disjunctive(&self, index: usize) -> Option<(Vec<String>, IndexMap<String, Vec<String>>)> {
        self.requests.lock()[index].disjunctive.clone()
    }

    /// Deliver `outcome` for request `index`, even if it was cancelled
    ///
    /// Models a response that slipped past cancellation.
    pub fn resolve(&self, index: usize, outcome: Result<ResultPayload, TransportError>) {
        let (state, completion) = {
            let mut requests = self.requests.lock();
            let request = &mut requests[index];
            (Arc::clone(&request.state), request.completion.take())
        };
        let completion = completion.expect("request resolved twice");
        state.finish();
        completion.complete(outcome);
    }

    /// Drop the completion of request `index` without resolving it
    pub fn abandon(&self, index: usize) {
        let completion = self.requests.lock()[index].completion.take();
        drop(completion);
    }
}

impl SearchTransport for MockTransport {
    fn execute_search(&self, query: &QueryState, completion: CompletionSender) -> Arc<dyn RequestHandle> {
        self.record(query, None, completion)
    }

    fn execute_disjunctive_search(
        &self,
        query: &QueryState,
        disjunctive_facets: &[String],
        refinements: &IndexMap<String, Vec<String>>,
        completion: CompletionSender,
    ) -> Arc<dyn RequestHandle> {
        self.record(
            query,
            Some((disjunctive_facets.to_vec(), refinements.clone())),
            completion,
        )
    }
}

/// What an observer was told
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Observed {
    Results {
        sequence: SequenceNumber,
        page: u32,
        hits: usize,
        is_loading_more: bool,
    },
    Error {
        query: QueryState,
        error: TransportError,
    },
}

/// Observer forwarding every callback to a channel
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<Observed>,
}

#[allow(dead_code)]
impl ChannelObserver {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Observed>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl ResultObserver for ChannelObserver {
    fn on_results(&self, results: &SearchResults, is_loading_more: bool) {
        let _ = self.sender.send(Observed::Results {
            sequence: results.sequence,
            page: results.page(),
            hits: results.hits().len(),
            is_loading_more,
        });
    }

    fn on_error(&self, query: &QueryState, error: &TransportError) {
        let _ = self.sender.send(Observed::Error {
            query: query.clone(),
            error: error.clone(),
        });
    }
}

/// Next observer callback, failing the test after one second
#[allow(dead_code)]
pub async fn next_observed(receiver: &mut mpsc::UnboundedReceiver<Observed>) -> Observed {
    match timeout(Duration::from_secs(1), receiver.recv()).await {
        Ok(Some(observed)) => observed,
        Ok(None) => panic!("observer channel closed"),
        Err(_) => panic!("Timeout waiting for observer callback"),
    }
}

/// Let background completion and dispatcher tasks run
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Assert no callback arrives while background tasks settle
#[allow(dead_code)]
pub async fn assert_no_callback(receiver: &mut mpsc::UnboundedReceiver<Observed>) {
    settle().await;
    if let Ok(observed) = receiver.try_recv() {
        panic!("unexpected observer callback: {observed:?}");
    }
}

/// Payload for `page` of `nb_pages` carrying `hits` hit objects
#[allow(dead_code)]
pub fn page_payload(page: u32, nb_pages: u32, hits: usize) -> ResultPayload {
    let hits: Vec<_> = (0..hits)
        .map(|i| json!({ "objectID": format!("{page}-{i}") }))
        .collect();
    ResultPayload::from_json(json!({
        "hits": hits,
        "page": page,
        "nbPages": nb_pages,
    }))
    .expect("payload parses")
}
