//! The search session façade
//!
//! A `Searcher` owns one query, its refinements and its pagination cursor,
//! sends requests through a `SearchTransport` and turns their out-of-order
//! completions into an ordered stream of observer callbacks and bus events.
//!
//! All mutable session state sits behind one lock. The lock is taken to
//! dispatch a request and again to process its completion, never across the
//! network wait. Observer callbacks run on a dispatcher task, after the lock
//! is released.

mod builder;
mod core;
mod dispatch;
mod refinements;
mod registry;

pub use builder::SearcherBuilder;
pub use self::core::Searcher;
pub use registry::SearcherRegistry;
