//! Requests awaiting completion

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::counter::SequenceNumber;
use crate::transport::RequestHandle;

/// Why a request was dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// First page of a fresh search
    NewSearch,
    /// Next page of the current search
    LoadMore,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewSearch => f.write_str("new_search"),
            Self::LoadMore => f.write_str("load_more"),
        }
    }
}

/// A dispatched request, owned by the sequencer until a terminal outcome
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub sequence: SequenceNumber,
    pub kind: RequestKind,
    pub handle: Arc<dyn RequestHandle>,
}
