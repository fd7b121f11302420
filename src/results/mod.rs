//! Response payloads
//!
//! The orchestrator only reads a handful of fields from a search response to
//! make control decisions; everything else travels untouched in `extra` and
//! in the raw hit objects.

mod payload;

pub use payload::{FacetCounts, ResultPayload, SearchResults};
