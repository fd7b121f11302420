//! Type-safe builder for `TransportConfig` using the typestate pattern
//!
//! `build()` only exists once the application id, API key and index name
//! have been supplied, in that order.

use anyhow::{Result, bail};
use std::marker::PhantomData;

use super::types::{DEFAULT_REQUEST_TIMEOUT_SECS, TransportConfig};

// Type states for the builder
pub struct WithAppId;
pub struct WithApiKey;
pub struct Complete;

pub struct TransportConfigBuilder<State = ()> {
    pub(crate) app_id: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) index_name: Option<String>,
    pub(crate) base_url: Option<String>,
    pub(crate) request_timeout_secs: u64,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for TransportConfigBuilder<()> {
    fn default() -> Self {
        Self {
            app_id: None,
            api_key: None,
            index_name: None,
            base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            _phantom: PhantomData,
        }
    }
}

impl TransportConfig {
    /// Create a builder for configuring a `TransportConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> TransportConfigBuilder<()> {
        TransportConfigBuilder::default()
    }
}

impl<State> TransportConfigBuilder<State> {
    fn into_state<Next>(self) -> TransportConfigBuilder<Next> {
        TransportConfigBuilder {
            app_id: self.app_id,
            api_key: self.api_key,
            index_name: self.index_name,
            base_url: self.base_url,
            request_timeout_secs: self.request_timeout_secs,
            _phantom: PhantomData,
        }
    }

    /// Override the service root (e.g. a proxy or a test server)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request timeout enforced by the HTTP client
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

impl TransportConfigBuilder<()> {
    pub fn app_id(mut self, app_id: impl Into<String>) -> TransportConfigBuilder<WithAppId> {
        self.app_id = Some(app_id.into());
        self.into_state()
    }
}

impl TransportConfigBuilder<WithAppId> {
    pub fn api_key(mut self, api_key: impl Into<String>) -> TransportConfigBuilder<WithApiKey> {
        self.api_key = Some(api_key.into());
        self.into_state()
    }
}

impl TransportConfigBuilder<WithApiKey> {
    pub fn index_name(mut self, index_name: impl Into<String>) -> TransportConfigBuilder<Complete> {
        self.index_name = Some(index_name.into());
        self.into_state()
    }
}

// Build method only available when all required fields are set
impl TransportConfigBuilder<Complete> {
    pub fn build(self) -> Result<TransportConfig> {
        let app_id = required("app_id", self.app_id)?;
        let api_key = required("api_key", self.api_key)?;
        let index_name = required("index_name", self.index_name)?;

        if let Some(url) = &self.base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            bail!("base_url must start with http:// or https://, got '{url}'");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }

        Ok(TransportConfig {
            app_id,
            api_key,
            index_name,
            base_url: self.base_url,
            request_timeout_secs: self.request_timeout_secs,
        })
    }
}

fn required(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("{name} is required and must not be empty"),
    }
}
