//! Result observers
//!
//! Observers are registered on a searcher and called back, in registration
//! order, for every accepted outcome. Registering the same observer twice is a
//! no-op: identity is the `Arc` allocation, not value equality.

use std::sync::Arc;

use crate::errors::TransportError;
use crate::query::QueryState;
use crate::results::SearchResults;

/// Receives accepted search outcomes
///
/// Callbacks run on the searcher's dispatcher task, outside its state lock,
/// so they may call back into the searcher (e.g. `load_more`).
pub trait ResultObserver: Send + Sync {
    /// `is_loading_more` is true when `results` is a follow-up page
    fn on_results(&self, results: &SearchResults, is_loading_more: bool);

    fn on_error(&self, query: &QueryState, error: &TransportError);
}

/// Observers in registration order, without duplicates
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn ResultObserver>>,
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.observers.len())
            .finish()
    }
}

impl ObserverSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if this exact observer was already registered
    pub fn register(&mut self, observer: Arc<dyn ResultObserver>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Returns `false` if the observer was not registered
    pub fn unregister(&mut self, observer: &Arc<dyn ResultObserver>) -> bool {
        let before = self.observers.len();
        self.observers
            .retain(|registered| !std::ptr::addr_eq(Arc::as_ptr(registered), Arc::as_ptr(observer)));
        self.observers.len() != before
    }

    #[must_use]
    pub fn contains(&self, observer: &Arc<dyn ResultObserver>) -> bool {
        self.observers
            .iter()
            .any(|registered| std::ptr::addr_eq(Arc::as_ptr(registered), Arc::as_ptr(observer)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ResultObserver>> {
        self.observers.iter()
    }

    /// Owned copy to iterate without holding the lock guarding the set
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn ResultObserver>> {
        self.observers.clone()
    }
}

/// One queued callback, delivered by the dispatcher task in queue order
#[derive(Debug, Clone)]
pub(crate) enum ObserverNotification {
    Results {
        results: SearchResults,
        is_loading_more: bool,
    },
    Error {
        query: QueryState,
        error: TransportError,
    },
}

impl ObserverNotification {
    pub(crate) fn deliver(&self, observers: &[Arc<dyn ResultObserver>]) {
        for observer in observers {
            match self {
                Self::Results {
                    results,
                    is_loading_more,
                } => observer.on_results(results, *is_loading_more),
                Self::Error { query, error } => observer.on_error(query, error),
            }
        }
    }
}
