//! Client-side search orchestration.
//!
//! A [`Searcher`] keeps the state of one search session (query text, facet,
//! numeric and boolean refinements, pagination cursor), sends requests through
//! a [`SearchTransport`] and reconciles their out-of-order completions so that
//! observers only ever see the most recent relevant result.

pub mod config;
pub mod errors;
pub mod facet_stats;
pub mod observer;
pub mod pagination;
pub mod query;
pub mod refinement;
pub mod results;
pub mod search_events;
pub mod searcher;
pub mod sequencer;
pub mod transport;

pub use config::{SearcherConfig, TransportConfig};
pub use errors::{SearcherError, SearcherResult, TransportError};
pub use facet_stats::{FacetStat, compute_facet_stats};
pub use observer::{ObserverSet, ResultObserver};
pub use pagination::{PaginationController, PaginationPhase, PaginationState};
pub use query::QueryState;
pub use refinement::{NumericOperator, NumericRefinement, RefinementStore};
pub use results::{FacetCounts, ResultPayload, SearchResults};
pub use search_events::{EventBusConfig, SearchEvent, SearchEventBus, ShutdownReason};
pub use searcher::{Searcher, SearcherBuilder, SearcherRegistry};
pub use sequencer::{RequestKind, SequenceNumber, SequenceSource};
pub use transport::{
    CompletionSender, HttpTransport, RequestHandle, RequestState, SearchTransport,
    TransportOutcome, completion_channel,
};
