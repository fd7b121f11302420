//! Construction of `Searcher`s

use std::sync::Arc;
use tokio::runtime::Handle;

use super::core::Searcher;
use crate::config::SearcherConfig;
use crate::errors::{SearcherError, SearcherResult};
use crate::search_events::{EventBusConfig, SearchEventBus};
use crate::sequencer::SequenceSource;
use crate::transport::SearchTransport;

/// Configures a `Searcher` before it starts
///
/// Without an explicit `SequenceSource` or `SearchEventBus` the searcher gets
/// private ones; pass shared ones to order several searchers against each
/// other (see `SearcherRegistry`).
pub struct SearcherBuilder {
    transport: Arc<dyn SearchTransport>,
    config: SearcherConfig,
    sequences: Option<SequenceSource>,
    events: Option<SearchEventBus>,
    id: u64,
}

impl Searcher {
    #[must_use]
    pub fn builder(transport: Arc<dyn SearchTransport>) -> SearcherBuilder {
        SearcherBuilder::new(transport)
    }
}

impl SearcherBuilder {
    #[must_use]
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            transport,
            config: SearcherConfig::default(),
            sequences: None,
            events: None,
            id: 0,
        }
    }

    #[must_use]
    pub fn config(mut self, config: SearcherConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn hits_per_page(mut self, hits_per_page: u32) -> Self {
        self.config.hits_per_page = Some(hits_per_page);
        self
    }

    #[must_use]
    pub fn sequence_source(mut self, sequences: SequenceSource) -> Self {
        self.sequences = Some(sequences);
        self
    }

    #[must_use]
    pub fn event_bus(mut self, events: SearchEventBus) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Start the searcher on the current tokio runtime
    ///
    /// # Errors
    /// `Config` when called outside a tokio runtime or with a zero event bus
    /// capacity.
    pub fn build(self) -> SearcherResult<Searcher> {
        let runtime = Handle::try_current().map_err(|_| {
            SearcherError::Config("a Searcher must be built inside a tokio runtime".to_string())
        })?;

        let events = match self.events {
            Some(events) => events,
            None => {
                check_bus_capacity(&self.config)?;
                SearchEventBus::with_config(event_bus_config(&self.config))
            }
        };

        Ok(Searcher::start(
            self.id,
            self.config,
            self.transport,
            self.sequences.unwrap_or_default(),
            events,
            runtime,
        ))
    }
}

/// Bus settings derived from a searcher configuration
pub(super) fn event_bus_config(config: &SearcherConfig) -> EventBusConfig {
    EventBusConfig {
        capacity: config.event_bus_capacity,
        drain_timeout: config.shutdown_drain(),
        ..Default::default()
    }
}

pub(super) fn check_bus_capacity(config: &SearcherConfig) -> SearcherResult<()> {
    if config.event_bus_capacity == 0 {
        return Err(SearcherError::Config(
            "event_bus_capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}
