//! Accept/ignore decisions for completed requests

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::counter::{SequenceNumber, SequenceSource};
use super::pending::{PendingRequest, RequestKind};
use crate::transport::RequestHandle;

/// Why a completion must not be displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The request had already left the pending table (cancelled)
    Cancelled,
    /// A response at least as new was already displayed
    Superseded,
}

/// Verdict on a completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Ignore(IgnoreReason),
}

impl Decision {
    #[must_use]
    pub fn is_accept(self) -> bool {
        matches!(self, Decision::Accept)
    }
}

/// Outcome of `RequestSequencer::complete`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub decision: Decision,
    /// Older requests cancelled preemptively, in ascending order
    pub cancelled: Vec<SequenceNumber>,
}

/// Tracks in-flight requests and orders their completions
#[derive(Debug)]
pub struct RequestSequencer {
    source: SequenceSource,
    pending: BTreeMap<SequenceNumber, PendingRequest>,
    last_displayed: SequenceNumber,
}

impl RequestSequencer {
    #[must_use]
    pub fn new(source: SequenceSource) -> Self {
        Self {
            source,
            pending: BTreeMap::new(),
            last_displayed: SequenceNumber::NONE,
        }
    }

    /// Allocate a number, start the request with it and track it as pending
    ///
    /// `start` receives the allocated number before the request exists, so the
    /// caller can announce the search with the right identifier.
    pub fn dispatch<F>(&mut self, kind: RequestKind, start: F) -> SequenceNumber
    where
        F: FnOnce(SequenceNumber) -> Arc<dyn RequestHandle>,
    {
        let sequence = self.source.next();
        let handle = start(sequence);
        debug!(sequence = sequence.get(), %kind, "request dispatched");
        self.pending.insert(
            sequence,
            PendingRequest {
                sequence,
                kind,
                handle,
            },
        );
        sequence
    }

    /// Record the completion of `sequence` and decide whether to display it
    pub fn complete(&mut self, sequence: SequenceNumber) -> Completion {
        if self.pending.remove(&sequence).is_none() {
            return Completion {
                decision: Decision::Ignore(IgnoreReason::Cancelled),
                cancelled: Vec::new(),
            };
        }

        let older: Vec<SequenceNumber> = self.pending.range(..sequence).map(|(n, _)| *n).collect();
        for number in &older {
            if let Some(request) = self.pending.remove(number) {
                request.handle.cancel();
                debug!(
                    sequence = number.get(),
                    superseded_by = sequence.get(),
                    "older request cancelled"
                );
            }
        }

        let decision = if sequence <= self.last_displayed {
            Decision::Ignore(IgnoreReason::Superseded)
        } else {
            self.last_displayed = sequence;
            Decision::Accept
        };

        Completion {
            decision,
            cancelled: older,
        }
    }

    /// Cancel every pending request and empty the table
    ///
    /// Returns the numbers whose handle was actually cancelled; requests whose
    /// handle already finished or was cancelled are dropped silently.
    /// Idempotent: a second call returns nothing.
    pub fn cancel_all(&mut self) -> Vec<SequenceNumber> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_values()
            .filter(|request| !request.handle.is_finished() && !request.handle.is_cancelled())
            .map(|request| {
                request.handle.cancel();
                request.sequence
            })
            .collect()
    }

    #[must_use]
    pub fn is_pending(&self, sequence: SequenceNumber) -> bool {
        self.pending.contains_key(&sequence)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending requests in ascending sequence order
    pub fn pending(&self) -> impl Iterator<Item = &PendingRequest> {
        self.pending.values()
    }

    /// Number of the most recently displayed response (never decreases)
    #[must_use]
    pub fn last_displayed(&self) -> SequenceNumber {
        self.last_displayed
    }

    #[must_use]
    pub fn source(&self) -> &SequenceSource {
        &self.source
    }
}
