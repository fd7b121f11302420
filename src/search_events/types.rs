//! Event type definitions for the search event system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::TransportError;
use crate::query::QueryState;
use crate::results::ResultPayload;
use crate::sequencer::{RequestKind, SequenceNumber};

/// Reason for event bus shutdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutdownReason {
    /// The owning searcher was shut down
    SearcherClosed,
    /// Shutdown after an unrecoverable error
    Error(String),
    /// Requested by the application
    Requested,
}

/// Lifecycle events of sequenced search requests
///
/// Only accepted outcomes are reported as `SearchSucceeded`/`SearchFailed`;
/// stale responses are dropped without an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchEvent {
    /// A request was handed to the transport
    SearchStarted {
        sequence: SequenceNumber,
        kind: RequestKind,
        query: QueryState,
        timestamp: DateTime<Utc>,
    },
    /// A pending request was cancelled before its response was used
    SearchCancelled {
        sequence: SequenceNumber,
        timestamp: DateTime<Utc>,
    },
    /// An accepted response
    SearchSucceeded {
        sequence: SequenceNumber,
        kind: RequestKind,
        payload: Arc<ResultPayload>,
        timestamp: DateTime<Utc>,
    },
    /// An accepted failure
    SearchFailed {
        sequence: SequenceNumber,
        kind: RequestKind,
        error: TransportError,
        timestamp: DateTime<Utc>,
    },
    /// Signals that the event bus is shutting down
    ///
    /// Subscribers should exit their event loops when receiving this event.
    Shutdown {
        reason: ShutdownReason,
        timestamp: DateTime<Utc>,
    },
}

impl SearchEvent {
    #[must_use]
    pub fn search_started(sequence: SequenceNumber, kind: RequestKind, query: QueryState) -> Self {
        Self::SearchStarted {
            sequence,
            kind,
            query,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn search_cancelled(sequence: SequenceNumber) -> Self {
        Self::SearchCancelled {
            sequence,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn search_succeeded(
        sequence: SequenceNumber,
        kind: RequestKind,
        payload: Arc<ResultPayload>,
    ) -> Self {
        Self::SearchSucceeded {
            sequence,
            kind,
            payload,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn search_failed(sequence: SequenceNumber, kind: RequestKind, error: TransportError) -> Self {
        Self::SearchFailed {
            sequence,
            kind,
            error,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn shutdown(reason: ShutdownReason) -> Self {
        Self::Shutdown {
            reason,
            timestamp: Utc::now(),
        }
    }

    /// Sequence number of the request this event is about
    #[must_use]
    pub fn sequence(&self) -> Option<SequenceNumber> {
        match self {
            Self::SearchStarted { sequence, .. }
            | Self::SearchCancelled { sequence, .. }
            | Self::SearchSucceeded { sequence, .. }
            | Self::SearchFailed { sequence, .. } => Some(*sequence),
            Self::Shutdown { .. } => None,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SearchStarted { timestamp, .. }
            | Self::SearchCancelled { timestamp, .. }
            | Self::SearchSucceeded { timestamp, .. }
            | Self::SearchFailed { timestamp, .. }
            | Self::Shutdown { timestamp, .. } => *timestamp,
        }
    }
}
