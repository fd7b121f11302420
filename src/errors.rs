//! Error types for the search orchestrator
//!
//! `SearcherError` covers everything surfaced to callers of the `Searcher`
//! API. `TransportError` is what a transport reports when a request completes
//! unsuccessfully; it is cloned out to every observer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sequencer::SequenceNumber;

/// Result type alias for searcher operations
pub type SearcherResult<T> = Result<T, SearcherError>;

/// Error types for searcher operations
#[derive(Debug, Error)]
pub enum SearcherError {
    /// Malformed argument supplied by the caller (e.g. unknown numeric operator code)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the transport when a request completed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A primary search completed after a newer result was already displayed.
    ///
    /// Preemptive cancellation makes this unreachable; seeing it means the
    /// sequencing bookkeeping is broken.
    #[error(
        "Search {sequence} completed after {last_displayed} was displayed; it should have been cancelled"
    )]
    ProtocolInvariantViolation {
        sequence: SequenceNumber,
        last_displayed: SequenceNumber,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearcherError {
    /// Check if this error indicates broken internal bookkeeping
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, SearcherError::ProtocolInvariantViolation { .. })
    }
}

/// Failure reported by a `SearchTransport` on request completion
///
/// The core never retries; retry policy belongs to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TransportError {
    /// The service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Connection, DNS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The transport dropped the completion without resolving it
    #[error("Transport dropped the request without completing it")]
    Dropped,

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Check if the failure is likely to go away on its own
    ///
    /// Informational only: useful to observers deciding whether to offer a retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Network(_) => true,
            TransportError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return TransportError::Decode(error.to_string());
        }
        match error.status() {
            Some(status) => TransportError::Http {
                status: status.as_u16(),
                message: error.to_string(),
            },
            None => TransportError::Network(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(error: serde_json::Error) -> Self {
        TransportError::Decode(error.to_string())
    }
}
