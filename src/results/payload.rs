//! `ResultPayload` and the observer-facing `SearchResults`

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::query::QueryState;
use crate::sequencer::SequenceNumber;

/// Facet value -> hit count, in response order
pub type FacetCounts = IndexMap<String, u64>;

/// Minimal typed view of a search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hits: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nb_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_hits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<u32>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub facets: IndexMap<String, FacetCounts>,
    /// Per-attribute numeric statistics; kept loose so a malformed entry
    /// degrades to "no stats" instead of failing the whole response
    #[serde(
        rename = "facets_stats",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub facets_stats: IndexMap<String, Value>,
    /// Counts computed by disjunctive faceting, one entry per disjunctive facet
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub disjunctive_facets: IndexMap<String, FacetCounts>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ResultPayload {
    /// Parse a raw response body
    ///
    /// # Errors
    /// Fails when the body is not a JSON object or a known field has the wrong type.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Whether the response contains at least one hit object
    ///
    /// A missing or null `hits` field and null entries count as no hits.
    #[must_use]
    pub fn has_hits(&self) -> bool {
        self.hits.iter().any(Value::is_object)
    }

    /// Whether the reported page is the last one
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        u64::from(self.nb_pages) == u64::from(self.page) + 1
    }
}

/// Read an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// What observers receive for an accepted response
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub sequence: SequenceNumber,
    /// Query the response answers, including the page it was requested for
    pub query: QueryState,
    pub payload: Arc<ResultPayload>,
}

impl SearchResults {
    #[must_use]
    pub fn hits(&self) -> &[Value] {
        &self.payload.hits
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.payload.page
    }

    #[must_use]
    pub fn nb_pages(&self) -> u32 {
        self.payload.nb_pages
    }
}
