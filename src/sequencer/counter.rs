//! Shared sequence-number allocation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a dispatched request, unique within a `SequenceSource`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// Value before any request was displayed
    pub const NONE: SequenceNumber = SequenceNumber(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic counter shared by every session that must be totally ordered
///
/// Clones share the same counter. Numbers start at 1 and are never reused.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    last: Arc<AtomicU64>,
}

impl SequenceSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next number
    pub fn next(&self) -> SequenceNumber {
        SequenceNumber(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Most recently allocated number (`NONE` if nothing was allocated)
    #[must_use]
    pub fn last(&self) -> SequenceNumber {
        SequenceNumber(self.last.load(Ordering::SeqCst))
    }
}
