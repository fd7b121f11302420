//! Transport collaborator
//!
//! The orchestrator never talks to the network itself. A `SearchTransport`
//! starts a request, hands back a `RequestHandle` the orchestrator can cancel,
//! and resolves the request's `CompletionSender` exactly once when the
//! response (or failure) is known.
//!
//! Cancellation is cooperative: a cancelled transport should drop the
//! completion instead of resolving it. If a response slips through anyway the
//! sequencer discards it.

mod disjunctive;
mod handle;
mod http;
mod params;

pub use handle::RequestState;
pub use http::HttpTransport;

use indexmap::IndexMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::errors::TransportError;
use crate::query::QueryState;
use crate::results::ResultPayload;

/// What a request resolves to
pub type TransportOutcome = Result<ResultPayload, TransportError>;

/// Control surface of an in-flight request
pub trait RequestHandle: Send + Sync + Debug {
    /// Ask the transport to drop the eventual response
    fn cancel(&self);

    fn is_finished(&self) -> bool;

    fn is_cancelled(&self) -> bool;
}

/// Executes searches on behalf of a `Searcher`
///
/// Both methods must return promptly: they are called while the searcher's
/// state lock is held and should only start the work.
pub trait SearchTransport: Send + Sync + 'static {
    fn execute_search(
        &self,
        query: &QueryState,
        completion: CompletionSender,
    ) -> Arc<dyn RequestHandle>;

    /// Search with OR-combined refinements on `disjunctive_facets`
    ///
    /// `refinements` maps every refined attribute to its values, conjunctive
    /// and disjunctive alike.
    fn execute_disjunctive_search(
        &self,
        query: &QueryState,
        disjunctive_facets: &[String],
        refinements: &IndexMap<String, Vec<String>>,
        completion: CompletionSender,
    ) -> Arc<dyn RequestHandle>;
}

/// Single-shot continuation of one request
///
/// `complete` consumes the sender, so a request resolves at most once.
/// Dropping it unresolved reports the request as cancelled, or as
/// `TransportError::Dropped` if nobody cancelled it.
#[derive(Debug)]
pub struct CompletionSender {
    sender: oneshot::Sender<TransportOutcome>,
}

impl CompletionSender {
    /// Deliver the outcome; returns `false` if nobody is waiting for it anymore
    pub fn complete(self, outcome: TransportOutcome) -> bool {
        self.sender.send(outcome).is_ok()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Create a completion pair for one request
#[must_use]
pub fn completion_channel() -> (CompletionSender, oneshot::Receiver<TransportOutcome>) {
    let (sender, receiver) = oneshot::channel();
    (CompletionSender { sender }, receiver)
}
