//! Core configuration types

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of buffered notification events
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1000;

/// Default time given to event subscribers to drain on shutdown
pub const DEFAULT_SHUTDOWN_DRAIN_MS: u64 = 500;

/// Default per-request timeout of the HTTP transport
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tuning of one search session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherConfig {
    /// Page size sent with every request; `None` keeps the service default
    pub hits_per_page: Option<u32>,
    /// Capacity of the notification channel when the searcher owns its bus
    pub event_bus_capacity: usize,
    /// How long `Searcher::shutdown` waits for event subscribers to drain
    pub shutdown_drain_ms: u64,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            hits_per_page: None,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
            shutdown_drain_ms: DEFAULT_SHUTDOWN_DRAIN_MS,
        }
    }
}

impl SearcherConfig {
    #[must_use]
    pub fn shutdown_drain(&self) -> Duration {
        Duration::from_millis(self.shutdown_drain_ms)
    }
}

/// Address and credentials of the remote search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub(crate) app_id: String,
    /// Never written back out when the config is serialized
    #[serde(skip_serializing, default)]
    pub(crate) api_key: String,
    pub(crate) index_name: String,
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub(crate) request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl TransportConfig {
    /// Read `ALGOLIA_APP_ID`, `ALGOLIA_API_KEY`, `ALGOLIA_INDEX_NAME` and the
    /// optional `ALGOLIA_BASE_URL`
    ///
    /// # Errors
    /// Fails when a required variable is missing or empty.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).with_context(|| format!("{name} is not set"));

        let mut builder = Self::builder()
            .app_id(var("ALGOLIA_APP_ID")?)
            .api_key(var("ALGOLIA_API_KEY")?)
            .index_name(var("ALGOLIA_INDEX_NAME")?);
        if let Ok(base_url) = std::env::var("ALGOLIA_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Service root without a trailing slash
    ///
    /// Defaults to the application's DSN host.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-dsn.algolia.net", self.app_id.to_lowercase()),
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Point subsequent requests at another index
    #[must_use]
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }
}
