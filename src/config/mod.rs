//! Configuration module
//!
//! `SearcherConfig` tunes a search session; `TransportConfig` (built through a
//! typestate builder) addresses the remote search service.

pub mod builder;
pub mod types;

pub use builder::{Complete, TransportConfigBuilder, WithApiKey, WithAppId};
pub use types::{SearcherConfig, TransportConfig};
