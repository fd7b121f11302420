//! Lookup of searchers by identifier

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::builder::{check_bus_capacity, event_bus_config};
use super::core::Searcher;
use crate::config::SearcherConfig;
use crate::errors::SearcherResult;
use crate::search_events::SearchEventBus;
use crate::sequencer::SequenceSource;
use crate::transport::SearchTransport;

/// Creates searchers that share one sequence source and one event bus
///
/// Sharing the source totally orders requests across every searcher of the
/// registry; sharing the bus gives one event stream for all of them.
/// Identifiers are assigned from 0 and never reused.
#[derive(Debug)]
pub struct SearcherRegistry {
    sequences: SequenceSource,
    events: SearchEventBus,
    config: SearcherConfig,
    searchers: DashMap<u64, Searcher>,
    next_id: AtomicU64,
}

impl Default for SearcherRegistry {
    fn default() -> Self {
        Self::new(SearcherConfig::default())
    }
}

impl SearcherRegistry {
    /// `config` applies to every searcher created by this registry
    ///
    /// The shared bus takes its capacity and drain timeout from `config`.
    #[must_use]
    pub fn new(config: SearcherConfig) -> Self {
        let events = SearchEventBus::with_config(event_bus_config(&config));
        Self::with_shared(SequenceSource::new(), events, config)
    }

    #[must_use]
    pub fn with_shared(sequences: SequenceSource, events: SearchEventBus, config: SearcherConfig) -> Self {
        Self {
            sequences,
            events,
            config,
            searchers: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Build and register a searcher over `transport`
    ///
    /// # Errors
    /// Same as `SearcherBuilder::build`, including a zero `event_bus_capacity`.
    pub fn create(&self, transport: Arc<dyn SearchTransport>) -> SearcherResult<Searcher> {
        check_bus_capacity(&self.config)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let searcher = Searcher::builder(transport)
            .id(id)
            .config(self.config.clone())
            .sequence_source(self.sequences.clone())
            .event_bus(self.events.clone())
            .build()?;
        self.searchers.insert(id, searcher.clone());
        debug!(searcher_id = id, "searcher registered");
        Ok(searcher)
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<Searcher> {
        self.searchers.get(&id).map(|entry| entry.value().clone())
    }

    /// Unregister a searcher; clones held elsewhere keep working
    pub fn remove(&self, id: u64) -> Option<Searcher> {
        self.searchers.remove(&id).map(|(_, searcher)| searcher)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.searchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.searchers.is_empty()
    }

    #[must_use]
    pub fn sequence_source(&self) -> &SequenceSource {
        &self.sequences
    }

    #[must_use]
    pub fn events(&self) -> &SearchEventBus {
        &self.events
    }
}
